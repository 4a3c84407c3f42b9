//! Inbound envelope as posted by the calling platform.

use crate::domain::ChannelError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flow_crypto::{MAX_IV_LEN, MIN_IV_LEN, TAG_LEN};
use serde::{Deserialize, Serialize};

/// JSON body of `POST /`. Every field is base64 text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_aes_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_flow_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_vector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_tag: Option<String>,
}

impl InboundEnvelope {
    /// No wrapped key: a platform health check, answered without the codec.
    pub fn is_liveness_probe(&self) -> bool {
        self.encrypted_aes_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty())
    }

    /// Decode the base64 fields.
    ///
    /// An empty `authentication_tag` counts as absent (tag appended to the
    /// ciphertext).
    pub fn decode(&self) -> Result<RequestEnvelope, ChannelError> {
        let wrapped_key = decode_field("encrypted_aes_key", self.encrypted_aes_key.as_deref())?;
        let ciphertext = decode_field("encrypted_flow_data", self.encrypted_flow_data.as_deref())?;
        let iv = decode_field("initial_vector", self.initial_vector.as_deref())?;

        if !(MIN_IV_LEN..=MAX_IV_LEN).contains(&iv.len()) {
            return Err(ChannelError::malformed(format!(
                "initial_vector is {} bytes, need {MIN_IV_LEN} to {MAX_IV_LEN}",
                iv.len()
            )));
        }

        let tag = match self.authentication_tag.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(encoded) => {
                let tag = decode_base64("authentication_tag", encoded)?;
                if tag.len() != TAG_LEN {
                    return Err(ChannelError::malformed(format!(
                        "authentication_tag is {} bytes, expected {TAG_LEN}",
                        tag.len()
                    )));
                }
                Some(tag)
            }
        };

        Ok(RequestEnvelope {
            wrapped_key,
            ciphertext,
            iv,
            tag,
        })
    }
}

fn decode_field(name: &str, value: Option<&str>) -> Result<Vec<u8>, ChannelError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ChannelError::malformed(format!("missing {name}")))?;
    decode_base64(name, value)
}

fn decode_base64(name: &str, value: &str) -> Result<Vec<u8>, ChannelError> {
    BASE64
        .decode(value)
        .map_err(|e| ChannelError::malformed(format!("{name}: {e}")))
}

/// Decoded envelope, immutable for the rest of the request.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    pub wrapped_key: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    /// `None`: the last 16 bytes of `ciphertext` are the tag
    pub tag: Option<Vec<u8>>,
}

impl std::fmt::Debug for RequestEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestEnvelope")
            .field("wrapped_key_len", &self.wrapped_key.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iv_len", &self.iv.len())
            .field("detached_tag", &self.tag.is_some())
            .finish()
    }
}
