//! Request opening and response sealing.
//!
//! ```text
//! wrapped_key ──RSA-OAEP──► session key ─┐
//! ciphertext, iv, tag? ──AES-GCM open────┴─► FlowRequest
//!
//! FlowResponse ──JSON──► AES-GCM seal (key, !iv) ──► base64(ct || tag)
//! ```

use super::envelope::RequestEnvelope;
use crate::domain::{ChannelError, EndpointError, FlowRequest, FlowResponse};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flow_crypto::{complement_iv, decrypt, encrypt, CryptoError, PrivateKeyMaterial, RsaPublicKey, SessionKey};
use std::fmt;
use zeroize::Zeroize;

/// Holds the server private key for the process lifetime.
#[derive(Debug)]
pub struct ChannelCodec {
    key: PrivateKeyMaterial,
}

impl ChannelCodec {
    pub fn new(key: PrivateKeyMaterial) -> Self {
        Self { key }
    }

    /// Load from configured PEM text.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        PrivateKeyMaterial::from_pem(pem).map(Self::new)
    }

    /// Public half, as distributed to calling clients.
    pub fn public_key(&self) -> RsaPublicKey {
        self.key.public_key()
    }

    /// Unwrap the session key, authenticate and decrypt, and parse the
    /// application request.
    ///
    /// The returned [`SessionContext`] seals the matching response.
    pub fn open(
        &self,
        envelope: &RequestEnvelope,
    ) -> Result<(FlowRequest, SessionContext), ChannelError> {
        let session_key = self.key.unwrap_session_key(&envelope.wrapped_key)?;
        let mut plaintext = decrypt(
            &session_key,
            &envelope.iv,
            &envelope.ciphertext,
            envelope.tag.as_deref(),
        )?;

        let parsed = serde_json::from_slice::<FlowRequest>(&plaintext)
            .map_err(|e| ChannelError::malformed(format!("request body: {e}")));
        plaintext.zeroize();

        let context = SessionContext {
            key: session_key,
            response_iv: complement_iv(&envelope.iv),
        };
        Ok((parsed?, context))
    }
}

/// Per-request key material for the response. Dropped (and zeroized) with
/// the request.
pub struct SessionContext {
    key: SessionKey,
    response_iv: Vec<u8>,
}

impl SessionContext {
    pub fn response_iv(&self) -> &[u8] {
        &self.response_iv
    }

    /// Serialize `{version, screen?, data}`, encrypt under the session key
    /// and the complemented IV, and base64 the `ciphertext || tag`.
    pub fn seal(&self, response: &FlowResponse) -> Result<String, EndpointError> {
        let mut body = serde_json::to_vec(&response.versioned())
            .map_err(|e| EndpointError::Internal(format!("response serialization: {e}")))?;
        let sealed = encrypt(&self.key, &self.response_iv, &body);
        body.zeroize();

        let sealed = sealed.map_err(|e| EndpointError::Internal(format!("response sealing: {e}")))?;
        Ok(BASE64.encode(sealed))
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("key", &self.key)
            .field("response_iv_len", &self.response_iv.len())
            .finish()
    }
}
