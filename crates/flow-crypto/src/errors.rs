//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The wrapped session key could not be recovered under the configured private key
    #[error("Session key unwrap failed")]
    KeyUnwrap,

    /// Authentication tag mismatch
    #[error("Authentication failed")]
    Authentication,

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length
    #[error("Invalid nonce length: expected 12 to 64, got {actual}")]
    InvalidNonceLength {
        /// Actual nonce length in bytes
        actual: usize,
    },

    /// Invalid authentication tag length
    #[error("Invalid tag length: expected {expected}, got {actual}")]
    InvalidTagLength {
        /// Expected tag length in bytes
        expected: usize,
        /// Actual tag length in bytes
        actual: usize,
    },

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),
}
