//! Lookup list normalization.

use super::types::{LookupItem, RawLookupRecord};
use std::collections::HashSet;

/// Title used when the upstream record has none.
pub const TITLE_SENTINEL: &str = "N/A";

/// Normalize upstream records into a dropdown list.
///
/// Duplicate ids keep the first occurrence; upstream order is otherwise
/// preserved. Records without an id are dropped. Idempotent: normalizing
/// the output again yields the same list.
pub fn normalize_lookup<I>(records: I) -> Vec<LookupItem>
where
    I: IntoIterator<Item = RawLookupRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.map(|id| id.trim().to_string())?;
            if id.is_empty() || !seen.insert(id.clone()) {
                return None;
            }
            let title = record
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| TITLE_SENTINEL.to_string());
            Some(LookupItem { id, title })
        })
        .collect()
}
