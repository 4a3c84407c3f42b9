//! Signature-verified member lookup (`POST /flow-member`).
//!
//! Plain JSON, no channel encryption. The caller signs the raw body:
//! `x-hub-signature-256: sha256=<hex(HMAC-SHA256(app_secret, body))>`.

use crate::ports::{MemberLookupPort, MemberSummary};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Signature check failure. The display text is the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("No signature")]
    Missing,
    #[error("Invalid signature")]
    Invalid,
}

/// `sha256=<hex>` signature of `body` under `secret`.
pub fn signature_for(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Invalid)?;
    mac.update(body);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Check a signature header against `body`. The digest comparison is
/// constant-time.
pub fn verify_signature(
    secret: &[u8],
    body: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SignatureError::Missing)?;

    let provided = header
        .strip_prefix(SIGNATURE_PREFIX)
        .and_then(|digest| hex::decode(digest).ok())
        .ok_or(SignatureError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Invalid)?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| SignatureError::Invalid)
}

#[derive(Debug, Default, Deserialize)]
struct LookupRequest {
    #[serde(default)]
    health_check: Value,
    #[serde(default)]
    mobile: Value,
}

/// Reply body for a member query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberReply {
    pub status: &'static str,
    pub name: String,
    pub dob: String,
    pub mobile: String,
}

impl MemberReply {
    pub fn error() -> Self {
        Self {
            status: "error",
            name: String::new(),
            dob: String::new(),
            mobile: String::new(),
        }
    }

    pub fn success(member: MemberSummary) -> Self {
        Self {
            status: "success",
            name: member.name,
            dob: member.dob,
            mobile: member.mobile,
        }
    }
}

/// Outcome of a verified request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LookupReply {
    Healthy { status: &'static str },
    Member(MemberReply),
}

/// Verifies and answers `/flow-member` requests.
pub struct MemberLookupHandler {
    secret: Zeroizing<Vec<u8>>,
    lookup: Arc<dyn MemberLookupPort>,
}

impl MemberLookupHandler {
    pub fn new(secret: impl Into<Vec<u8>>, lookup: Arc<dyn MemberLookupPort>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            lookup,
        }
    }

    pub fn verify(&self, body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        verify_signature(&self.secret, body, header)
    }

    /// Answer a verified body. Upstream and parse failures become the error
    /// shape; this never fails.
    pub async fn respond(&self, body: &[u8]) -> LookupReply {
        let request: LookupRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Unparseable member lookup body");
                LookupRequest::default()
            }
        };

        if is_truthy(&request.health_check) {
            return LookupReply::Healthy { status: "healthy" };
        }

        let Some(mobile) = text(&request.mobile) else {
            return LookupReply::Member(MemberReply::error());
        };

        match self.lookup.find_member(&mobile).await {
            Ok(member) => LookupReply::Member(MemberReply::success(member)),
            Err(e) => {
                warn!(lookup = "member", error = %e, "Member lookup failed");
                LookupReply::Member(MemberReply::error())
            }
        }
    }
}

impl fmt::Debug for MemberLookupHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberLookupHandler").finish_non_exhaustive()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
