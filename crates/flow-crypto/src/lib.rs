//! # Flow Crypto - Confidential Channel Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `key_unwrap` | RSA-OAEP-SHA-256 | Per-request session key transport |
//! | `symmetric` | AES-128-GCM | Request/response payload encryption |
//!
//! ## Security Properties
//!
//! - **Session keys** are zeroized on drop and never implement a revealing `Debug`
//! - **Unwrap failures** collapse into a single `KeyUnwrap` error
//! - **Tag failures** never return partial plaintext
//! - **Response IV** is the bitwise complement of the request IV, as the
//!   calling client requires

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod key_unwrap;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use key_unwrap::{normalize_pem, wrap_session_key, PrivateKeyMaterial};
pub use rsa::{RsaPrivateKey, RsaPublicKey};
pub use symmetric::{
    complement_iv, decrypt, encrypt, SessionKey, MAX_IV_LEN, MIN_IV_LEN, TAG_LEN,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
