//! Flow token to member identifier.
//!
//! The calling platform puts the user's phone number in `flow_token`.
//! Builder previews and test harnesses send placeholder strings instead,
//! which resolve to the configured default identifier.

use super::config::FlowConfig;

/// Normalize a flow token into the identifier used for the profile lookup.
///
/// - missing, blank, placeholder or non-numeric → `default_identifier`
/// - a leading `+` is dropped
/// - a leading country code is stripped when the token is longer than a
///   bare local number
pub fn normalize_token(token: Option<&str>, flow: &FlowConfig) -> String {
    let Some(raw) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return flow.default_identifier.clone();
    };

    if flow
        .placeholder_tokens
        .iter()
        .any(|placeholder| placeholder.eq_ignore_ascii_case(raw))
    {
        return flow.default_identifier.clone();
    }

    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return flow.default_identifier.clone();
    }

    if digits.len() > flow.local_number_length {
        if let Some(local) = digits.strip_prefix(flow.country_code.as_str()) {
            if !local.is_empty() {
                return local.to_string();
            }
        }
    }

    digits.to_string()
}
