//! HTTP adapter for the member directory.
//!
//! ## Upstream contract
//!
//! Every endpoint answers with a lowercase envelope:
//!
//! ```text
//! { "status": <success marker>, "data": <payload> }
//! ```
//!
//! - success markers: `true`, `1`, `200`, `"success"`, `"ok"`, `"true"`, `"1"`, `"200"`
//! - list endpoints: `data` is an array of records (`null` reads as empty)
//! - profile endpoint: `data` is one record, a one-element array, or `null`
//!
//! A capitalized `{Status, Data}` envelope is a contract violation and is
//! reported as [`DirectoryError::ShapeMismatch`], not coerced.

use crate::domain::{DirectoryConfig, LookupKind, MemberProfile, RawLookupRecord};
use crate::ports::{DirectoryError, DirectoryPort};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;

/// Directory client over HTTPS.
pub struct HttpDirectory {
    client: Client,
    base_url: String,
    api_key_header: HeaderName,
    api_key: Option<HeaderValue>,
}

impl HttpDirectory {
    /// Build the client. Header name and value are validated here so a bad
    /// configuration fails at startup, not on the first request.
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        let api_key_header = HeaderName::from_bytes(config.api_key_header.trim().as_bytes())
            .map_err(|e| DirectoryError::Transport(format!("invalid api key header: {e}")))?;

        let api_key = if config.api_key.is_empty() {
            None
        } else {
            let mut value = HeaderValue::from_str(&config.api_key)
                .map_err(|_| DirectoryError::Transport("invalid api key value".into()))?;
            value.set_sensitive(true);
            Some(value)
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key_header,
            api_key,
        })
    }

    async fn get_data(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, DirectoryError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query);
        if let Some(key) = &self.api_key {
            request = request.header(self.api_key_header.clone(), key.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.without_url().to_string()))?;

        debug!(path, "directory response received");
        envelope_data(body)
    }

    async fn fetch_list(
        &self,
        kind: LookupKind,
        query: &[(&str, &str)],
    ) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        let fields = ListFields::of(kind);
        let data = self.get_data(fields.path, query).await?;
        records_from_data(kind, data)
    }
}

#[async_trait]
impl DirectoryPort for HttpDirectory {
    async fn member_profile(&self, identifier: &str) -> Result<MemberProfile, DirectoryError> {
        let data = self
            .get_data("membershipdata", &[("MobileNo", identifier)])
            .await?;
        profile_from_data(data)
    }

    async fn countries(&self) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        self.fetch_list(LookupKind::Country, &[]).await
    }

    async fn states(&self, country_id: &str) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        self.fetch_list(LookupKind::State, &[("CountryId", country_id)])
            .await
    }

    async fn sub_regions(&self, state_id: &str) -> Result<Vec<RawLookupRecord>, DirectoryError> {
        self.fetch_list(LookupKind::SubRegion, &[("StateId", state_id)])
            .await
    }
}

/// Path and record field names per list.
struct ListFields {
    path: &'static str,
    id: &'static str,
    title: &'static str,
}

impl ListFields {
    fn of(kind: LookupKind) -> Self {
        match kind {
            LookupKind::Country => Self {
                path: "country",
                id: "CountryId",
                title: "CountryName",
            },
            LookupKind::State => Self {
                path: "state",
                id: "StateId",
                title: "StateName",
            },
            LookupKind::SubRegion => Self {
                path: "parishad",
                id: "ParishadId",
                title: "ParishadName",
            },
        }
    }
}

/// Validate the `{status, data}` envelope and return `data`.
pub(crate) fn envelope_data(body: Value) -> Result<Value, DirectoryError> {
    let Value::Object(mut envelope) = body else {
        return Err(DirectoryError::ShapeMismatch(
            "envelope is not an object".into(),
        ));
    };

    let Some(status) = envelope.get("status") else {
        let detail = if envelope.contains_key("Status") || envelope.contains_key("Data") {
            "capitalized Status/Data envelope"
        } else {
            "missing status"
        };
        return Err(DirectoryError::ShapeMismatch(detail.into()));
    };

    if !is_success(status) {
        return Err(DirectoryError::Rejected(status.to_string()));
    }

    Ok(envelope.remove("data").unwrap_or(Value::Null))
}

fn is_success(status: &Value) -> bool {
    match status {
        Value::Bool(flag) => *flag,
        Value::Number(n) => matches!(n.as_u64(), Some(1) | Some(200)),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "success" | "ok" | "true" | "1" | "200"
        ),
        _ => false,
    }
}

pub(crate) fn records_from_data(
    kind: LookupKind,
    data: Value,
) -> Result<Vec<RawLookupRecord>, DirectoryError> {
    let fields = ListFields::of(kind);
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .iter()
            .map(|item| match item {
                Value::Object(record) => RawLookupRecord {
                    id: field_string(record, fields.id),
                    title: field_string(record, fields.title),
                },
                _ => RawLookupRecord::default(),
            })
            .collect()),
        other => Err(DirectoryError::ShapeMismatch(format!(
            "{kind} list data is {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn profile_from_data(data: Value) -> Result<MemberProfile, DirectoryError> {
    let record = match data {
        Value::Null => return Ok(MemberProfile::default()),
        Value::Object(record) => record,
        Value::Array(items) => match items.into_iter().next() {
            None => return Ok(MemberProfile::default()),
            Some(Value::Object(record)) => record,
            Some(other) => {
                return Err(DirectoryError::ShapeMismatch(format!(
                    "profile record is {}",
                    json_kind(&other)
                )))
            }
        },
        other => {
            return Err(DirectoryError::ShapeMismatch(format!(
                "profile data is {}",
                json_kind(&other)
            )))
        }
    };

    let field = |key: &str| field_string(&record, key).unwrap_or_default();
    Ok(MemberProfile {
        name: field("MemberName"),
        father_name: field("FatherName"),
        date_of_birth: field("dob"),
        email: field("EmailId"),
        mobile: field("MobileNo"),
        country_id: field("CountryId"),
        state_id: field("StateId"),
        parishad_id: field("ParishadId"),
    })
}

/// Text value of a record field; numeric ids are rendered in decimal.
fn field_string(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
