//! # Symmetric Payload Codec
//!
//! AES-128-GCM over the per-request session key.
//!
//! ## Wire Rules
//!
//! - Request IV: any length from [`MIN_IV_LEN`] to [`MAX_IV_LEN`] bytes, chosen by
//!   the calling client; lengths other than 12 go through GCM's GHASH counter
//!   derivation
//! - Request tag: either supplied separately, or the last 16 bytes of the ciphertext
//! - Response IV: bitwise complement of the request IV ([`complement_iv`])
//! - Response body: `ciphertext || tag`, nothing prepended
//!
//! A failed tag check never returns plaintext; the scratch buffer is wiped
//! before the error is surfaced.

use crate::CryptoError;
use aes_gcm::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    aes::Aes128,
    AesGcm,
};
use std::fmt;
use zeroize::Zeroize;

/// Session key length in bytes (AES-128).
pub const SESSION_KEY_LEN: usize = 16;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Shortest IV the channel accepts.
pub const MIN_IV_LEN: usize = 12;

/// Longest IV the channel accepts.
pub const MAX_IV_LEN: usize = 64;

/// Calls `$f::<AesGcm<Aes128, N>>(args..)` with the nonce size matching `$len`.
macro_rules! with_nonce_size {
    ($len:expr, $f:ident($($arg:expr),*)) => {
        with_nonce_size!(@arms $len, $f ($($arg),*);
            12 U12, 13 U13, 14 U14, 15 U15, 16 U16, 17 U17, 18 U18, 19 U19,
            20 U20, 21 U21, 22 U22, 23 U23, 24 U24, 25 U25, 26 U26, 27 U27,
            28 U28, 29 U29, 30 U30, 31 U31, 32 U32, 33 U33, 34 U34, 35 U35,
            36 U36, 37 U37, 38 U38, 39 U39, 40 U40, 41 U41, 42 U42, 43 U43,
            44 U44, 45 U45, 46 U46, 47 U47, 48 U48, 49 U49, 50 U50, 51 U51,
            52 U52, 53 U53, 54 U54, 55 U55, 56 U56, 57 U57, 58 U58, 59 U59,
            60 U60, 61 U61, 62 U62, 63 U63, 64 U64)
    };
    (@arms $len:expr, $f:ident $args:tt; $($n:literal $size:ident),*) => {
        match $len {
            $($n => $f::<AesGcm<Aes128, aes_gcm::aead::consts::$size>> $args,)*
            actual => Err(CryptoError::InvalidNonceLength { actual }),
        }
    };
}

/// Per-request symmetric key (128-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SessionKey([u8; SESSION_KEY_LEN]);

impl SessionKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SESSION_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; SESSION_KEY_LEN] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: SESSION_KEY_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Derive the response IV: every bit of every byte of the request IV flipped.
pub fn complement_iv(iv: &[u8]) -> Vec<u8> {
    iv.iter().map(|byte| !byte).collect()
}

/// Decrypt a request payload.
///
/// With `tag = Some(..)` the ciphertext is taken as-is; with `None` the last
/// [`TAG_LEN`] bytes of `ciphertext` are split off and used as the tag.
///
/// # Errors
///
/// - `CryptoError::Authentication` on tag mismatch
/// - `CryptoError::InvalidTagLength` if the tag is missing or mis-sized
/// - `CryptoError::InvalidNonceLength` for IVs outside [`MIN_IV_LEN`]..=[`MAX_IV_LEN`]
pub fn decrypt(
    key: &SessionKey,
    iv: &[u8],
    ciphertext: &[u8],
    tag: Option<&[u8]>,
) -> Result<Vec<u8>, CryptoError> {
    let (body, tag) = match tag {
        Some(tag) => (ciphertext, tag),
        None => {
            if ciphertext.len() < TAG_LEN {
                return Err(CryptoError::InvalidTagLength {
                    expected: TAG_LEN,
                    actual: ciphertext.len(),
                });
            }
            ciphertext.split_at(ciphertext.len() - TAG_LEN)
        }
    };

    if tag.len() != TAG_LEN {
        return Err(CryptoError::InvalidTagLength {
            expected: TAG_LEN,
            actual: tag.len(),
        });
    }

    with_nonce_size!(iv.len(), open_with(key, iv, body, tag))
}

/// Encrypt a response payload, returning `ciphertext || tag`.
///
/// # Errors
///
/// Returns `CryptoError::InvalidNonceLength` for IVs outside
/// [`MIN_IV_LEN`]..=[`MAX_IV_LEN`].
pub fn encrypt(key: &SessionKey, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    with_nonce_size!(iv.len(), seal_with(key, iv, plaintext))
}

fn open_with<C>(key: &SessionKey, iv: &[u8], body: &[u8], tag: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: AeadInPlace + KeyInit,
{
    let cipher = C::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: SESSION_KEY_LEN,
        actual: key.as_bytes().len(),
    })?;

    let mut buffer = body.to_vec();
    match cipher.decrypt_in_place_detached(
        GenericArray::from_slice(iv),
        b"",
        &mut buffer,
        GenericArray::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(CryptoError::Authentication)
        }
    }
}

fn seal_with<C>(key: &SessionKey, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: AeadInPlace + KeyInit,
{
    let cipher = C::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: SESSION_KEY_LEN,
        actual: key.as_bytes().len(),
    })?;

    let mut buffer = Vec::with_capacity(plaintext.len() + TAG_LEN);
    buffer.extend_from_slice(plaintext);
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv), b"", &mut buffer)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    buffer.extend_from_slice(&tag);
    Ok(buffer)
}
