//! Per-request correlation id (UUID v7, time-ordered).

use std::fmt;
use uuid::Uuid;

/// Header a caller may use to supply its own id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Id attached to the request span and echoed in the response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Reuse a caller-supplied id when it is a valid UUID, else mint one.
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(Self)
            .unwrap_or_default()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
