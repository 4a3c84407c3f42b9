//! Outbound ports: the external services the endpoint reads from.

use crate::domain::{MemberProfile, RawLookupRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upstream fetch failure.
///
/// Absorbed by the aggregator (degrades to empty values) and by the member
/// lookup handler (degrades to the error shape); never reaches the caller
/// as an HTTP failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Connect, timeout or client construction failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP status
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// Upstream answered with a non-success envelope status
    #[error("upstream rejected the request: {0}")]
    Rejected(String),

    /// Envelope did not match the documented `{status, data}` contract
    #[error("unexpected envelope shape: {0}")]
    ShapeMismatch(String),

    /// Body was not JSON
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only member directory (profile and reference lists).
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    /// Profile for a normalized mobile identifier.
    async fn member_profile(&self, identifier: &str) -> Result<MemberProfile, DirectoryError>;

    async fn countries(&self) -> Result<Vec<RawLookupRecord>, DirectoryError>;

    async fn states(&self, country_id: &str) -> Result<Vec<RawLookupRecord>, DirectoryError>;

    /// Sub-regions (parishads) of a state.
    async fn sub_regions(&self, state_id: &str) -> Result<Vec<RawLookupRecord>, DirectoryError>;
}

/// Member summary returned by the chatbot lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberSummary {
    pub name: String,
    pub dob: String,
    pub mobile: String,
}

/// Chatbot-facing member lookup.
#[async_trait]
pub trait MemberLookupPort: Send + Sync {
    async fn find_member(&self, mobile: &str) -> Result<MemberSummary, DirectoryError>;
}
