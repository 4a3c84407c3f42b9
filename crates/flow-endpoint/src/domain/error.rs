//! Endpoint error types.
//!
//! Channel failures collapse into a single externally visible outcome
//! (HTTP 421, "Key Refresh Required") so a caller cannot tell which
//! cryptographic step failed. The variant survives only in logs.

use super::config::ConfigError;
use crate::ports::DirectoryError;
use flow_crypto::CryptoError;
use thiserror::Error;

/// Body returned with every channel failure.
pub const KEY_REFRESH_REQUIRED: &str = "Key Refresh Required";

/// Confidential channel failure
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Session key could not be recovered with the server key
    #[error("session key unwrap failed")]
    KeyUnwrap,

    /// GCM tag mismatch
    #[error("payload authentication failed")]
    Authentication,

    /// Bad base64, bad JSON, missing envelope field, unusable IV or tag
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl ChannelError {
    /// Short label for logs.
    pub fn class(&self) -> &'static str {
        match self {
            ChannelError::KeyUnwrap => "key_unwrap",
            ChannelError::Authentication => "authentication",
            ChannelError::MalformedPayload(_) => "malformed_payload",
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        ChannelError::MalformedPayload(detail.into())
    }
}

impl From<CryptoError> for ChannelError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyUnwrap | CryptoError::InvalidKeyLength { .. } => {
                ChannelError::KeyUnwrap
            }
            CryptoError::Authentication => ChannelError::Authentication,
            other => ChannelError::MalformedPayload(other.to_string()),
        }
    }
}

/// Startup and internal failures
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Private key could not be loaded
    #[error("key material error: {0}")]
    Key(#[source] CryptoError),

    /// Outbound client could not be built
    #[error("directory client error: {0}")]
    Directory(#[from] DirectoryError),

    /// Listener bind or serve failure
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// Response could not be serialized or sealed
    #[error("internal error: {0}")]
    Internal(String),
}
