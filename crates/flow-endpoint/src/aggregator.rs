//! Reference data aggregator.
//!
//! Wraps the directory port and absorbs its failures: a failed list fetch
//! yields an empty list and a failed profile fetch yields an all-empty
//! profile, so one bad upstream call never aborts a form session.

use crate::domain::{normalize_lookup, LookupItem, LookupKind, MemberProfile, RawLookupRecord};
use crate::ports::{DirectoryError, DirectoryPort};
use std::sync::Arc;
use tracing::{debug, warn};

/// Normalized, failure-absorbing view of the directory.
#[derive(Clone)]
pub struct ReferenceDataAggregator {
    directory: Arc<dyn DirectoryPort>,
}

impl ReferenceDataAggregator {
    pub fn new(directory: Arc<dyn DirectoryPort>) -> Self {
        Self { directory }
    }

    pub async fn member_profile(&self, identifier: &str) -> MemberProfile {
        match self.directory.member_profile(identifier).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(lookup = "member_profile", error = %e, "Directory fetch failed, using empty profile");
                MemberProfile::default()
            }
        }
    }

    pub async fn countries(&self) -> Vec<LookupItem> {
        absorb(LookupKind::Country, self.directory.countries().await)
    }

    /// States of `country_id`. A blank id skips the upstream call.
    pub async fn states(&self, country_id: &str) -> Vec<LookupItem> {
        if country_id.trim().is_empty() {
            debug!(lookup = %LookupKind::State, "No country selected, skipping fetch");
            return Vec::new();
        }
        absorb(LookupKind::State, self.directory.states(country_id).await)
    }

    /// Sub-regions of `state_id`. A blank id skips the upstream call.
    pub async fn sub_regions(&self, state_id: &str) -> Vec<LookupItem> {
        if state_id.trim().is_empty() {
            debug!(lookup = %LookupKind::SubRegion, "No state selected, skipping fetch");
            return Vec::new();
        }
        absorb(
            LookupKind::SubRegion,
            self.directory.sub_regions(state_id).await,
        )
    }

    /// Profile and country list, fetched concurrently.
    pub async fn profile_and_countries(&self, identifier: &str) -> (MemberProfile, Vec<LookupItem>) {
        tokio::join!(self.member_profile(identifier), self.countries())
    }
}

fn absorb(
    kind: LookupKind,
    result: Result<Vec<RawLookupRecord>, DirectoryError>,
) -> Vec<LookupItem> {
    match result {
        Ok(records) => normalize_lookup(records),
        Err(e) => {
            warn!(lookup = %kind, error = %e, "Directory fetch failed, using empty list");
            Vec::new()
        }
    }
}
