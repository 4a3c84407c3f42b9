//! The calling client's half of the channel.
//!
//! Used by the integration tests and handy for driving a deployed endpoint
//! by hand: wraps a fresh session key under the server public key, encrypts
//! the request, and opens the sealed response.

use super::envelope::InboundEnvelope;
use crate::domain::ChannelError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flow_crypto::{complement_iv, decrypt, encrypt, wrap_session_key, RsaPublicKey, SessionKey, TAG_LEN};
use rand::RngCore;
use serde::Serialize;

/// Where the request tag travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    /// Last 16 bytes of `encrypted_flow_data`
    #[default]
    Appended,
    /// Separate `authentication_tag` field
    Detached,
}

/// Builds encrypted envelopes for one server key.
#[derive(Debug, Clone)]
pub struct FlowClient {
    server_key: RsaPublicKey,
    iv_len: usize,
    tag_mode: TagMode,
}

impl FlowClient {
    pub fn new(server_key: RsaPublicKey) -> Self {
        Self {
            server_key,
            iv_len: 16,
            tag_mode: TagMode::default(),
        }
    }

    pub fn with_iv_len(mut self, iv_len: usize) -> Self {
        self.iv_len = iv_len;
        self
    }

    pub fn with_tag_mode(mut self, tag_mode: TagMode) -> Self {
        self.tag_mode = tag_mode;
        self
    }

    /// Encrypt a JSON request.
    pub fn seal_request<T: Serialize>(
        &self,
        request: &T,
    ) -> Result<(InboundEnvelope, ClientSession), ChannelError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| ChannelError::malformed(format!("request serialization: {e}")))?;
        self.seal_raw(&body)
    }

    /// Encrypt arbitrary bytes as the request body.
    pub fn seal_raw(&self, body: &[u8]) -> Result<(InboundEnvelope, ClientSession), ChannelError> {
        let key = SessionKey::generate();
        let mut iv = vec![0u8; self.iv_len];
        rand::thread_rng().fill_bytes(&mut iv);

        let wrapped = wrap_session_key(&self.server_key, &key)?;
        let sealed = encrypt(&key, &iv, body)?;

        let (flow_data, tag) = match self.tag_mode {
            TagMode::Appended => (sealed, None),
            TagMode::Detached => {
                let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);
                (ciphertext.to_vec(), Some(BASE64.encode(tag)))
            }
        };

        let envelope = InboundEnvelope {
            encrypted_aes_key: Some(BASE64.encode(wrapped)),
            encrypted_flow_data: Some(BASE64.encode(flow_data)),
            initial_vector: Some(BASE64.encode(&iv)),
            authentication_tag: tag,
        };
        Ok((envelope, ClientSession { key, request_iv: iv }))
    }
}

/// Session state the client keeps to read the response.
#[derive(Debug)]
pub struct ClientSession {
    key: SessionKey,
    request_iv: Vec<u8>,
}

impl ClientSession {
    /// Decrypt a base64 response body into JSON.
    pub fn open_response(&self, body: &str) -> Result<serde_json::Value, ChannelError> {
        let sealed = BASE64
            .decode(body.trim())
            .map_err(|e| ChannelError::malformed(format!("response body: {e}")))?;
        let plaintext = decrypt(&self.key, &complement_iv(&self.request_iv), &sealed, None)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| ChannelError::malformed(format!("response json: {e}")))
    }
}
