//! HTTP adapter for the chatbot member lookup service.
//!
//! Upstream answers `{status: "success", name, dob, mobile}` on a hit and any
//! other `status` on a miss.

use crate::domain::MemberLookupConfig;
use crate::ports::{DirectoryError, MemberLookupPort, MemberSummary};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct LookupReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    dob: Option<String>,
    #[serde(default)]
    mobile: Option<String>,
}

impl LookupReply {
    fn into_summary(self) -> Result<MemberSummary, DirectoryError> {
        match self.status.as_deref() {
            Some("success") => Ok(MemberSummary {
                name: self.name.unwrap_or_default(),
                dob: self.dob.unwrap_or_default(),
                mobile: self.mobile.unwrap_or_default(),
            }),
            other => Err(DirectoryError::Rejected(
                other.unwrap_or("missing status").to_string(),
            )),
        }
    }
}

/// Member lookup over HTTPS.
pub struct HttpMemberLookup {
    client: Client,
    url: String,
}

impl HttpMemberLookup {
    pub fn new(config: &MemberLookupConfig, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl MemberLookupPort for HttpMemberLookup {
    async fn find_member(&self, mobile: &str) -> Result<MemberSummary, DirectoryError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("mobile", mobile)])
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }

        let reply: LookupReply = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.without_url().to_string()))?;
        reply.into_summary()
    }
}
