//! Endpoint configuration with validation.
//!
//! Built once at startup from the environment and passed by reference into
//! the codec, adapters and service. Nothing here is re-read per request.

use super::types::LookupItem;
use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

const REDACTED: &str = "[redacted]";

/// Main endpoint configuration
#[derive(Debug, Clone, Default)]
pub struct EndpointConfig {
    /// HTTP listener
    pub http: HttpConfig,
    /// Server key material
    pub keys: KeyConfig,
    /// External directory service
    pub directory: DirectoryConfig,
    /// Flow behaviour (identifier policy, list placeholder)
    pub flow: FlowConfig,
    /// Signature-verified member lookup route
    pub member_lookup: MemberLookupConfig,
}

impl EndpointConfig {
    /// Load from process environment.
    ///
    /// # Environment Variables
    ///
    /// - `HOST`, `PORT` (default `0.0.0.0:3000`), `MAX_BODY_BYTES`
    /// - `PRIVATE_KEY` (required)
    /// - `DIRECTORY_BASE_URL`, `DIRECTORY_API_KEY`, `DIRECTORY_API_KEY_HEADER`,
    ///   `DIRECTORY_TIMEOUT_SECS`
    /// - `FLOW_DEFAULT_IDENTIFIER`, `FLOW_COUNTRY_CODE`, `FLOW_PLACEHOLDER_TOKENS`,
    ///   `FLOW_EMPTY_LIST_PLACEHOLDER`
    /// - `APP_SECRET`, `MEMBER_LOOKUP_URL`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let http = HttpConfig {
            host: parse_var(&lookup, "HOST")?.unwrap_or(defaults.http.host),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.http.port),
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES")?
                .unwrap_or(defaults.http.max_body_bytes),
        };

        let keys = KeyConfig {
            private_key_pem: lookup("PRIVATE_KEY").unwrap_or_default(),
        };

        let directory = DirectoryConfig {
            base_url: lookup("DIRECTORY_BASE_URL").unwrap_or(defaults.directory.base_url),
            api_key: lookup("DIRECTORY_API_KEY").unwrap_or_default(),
            api_key_header: lookup("DIRECTORY_API_KEY_HEADER")
                .unwrap_or(defaults.directory.api_key_header),
            timeout: parse_var::<u64, _>(&lookup, "DIRECTORY_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.directory.timeout),
        };

        let mut placeholder_tokens = defaults.flow.placeholder_tokens;
        if let Some(extra) = lookup("FLOW_PLACEHOLDER_TOKENS") {
            placeholder_tokens.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from),
            );
        }

        let empty_list_placeholder = match parse_flag(&lookup, "FLOW_EMPTY_LIST_PLACEHOLDER")? {
            Some(false) => None,
            _ => defaults.flow.empty_list_placeholder,
        };

        let flow = FlowConfig {
            default_identifier: lookup("FLOW_DEFAULT_IDENTIFIER")
                .unwrap_or(defaults.flow.default_identifier),
            country_code: lookup("FLOW_COUNTRY_CODE").unwrap_or(defaults.flow.country_code),
            local_number_length: defaults.flow.local_number_length,
            placeholder_tokens,
            empty_list_placeholder,
        };

        let member_lookup = MemberLookupConfig {
            app_secret: lookup("APP_SECRET"),
            url: lookup("MEMBER_LOOKUP_URL").unwrap_or(defaults.member_lookup.url),
        };

        Ok(Self {
            http,
            keys,
            directory,
            flow,
            member_lookup,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keys.private_key_pem.trim().is_empty() {
            return Err(ConfigError::Missing("PRIVATE_KEY"));
        }

        if self.http.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }

        if !is_http_url(&self.directory.base_url) {
            return Err(ConfigError::Invalid(format!(
                "directory base url must be http(s): {}",
                self.directory.base_url
            )));
        }

        if self.directory.api_key_header.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "directory api key header cannot be empty".into(),
            ));
        }

        if self.directory.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "directory timeout cannot be 0".into(),
            ));
        }

        let identifier = &self.flow.default_identifier;
        if identifier.is_empty() || !identifier.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::Invalid(
                "default identifier must be numeric".into(),
            ));
        }

        if !self.flow.country_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::Invalid("country code must be numeric".into()));
        }

        if self.member_lookup.app_secret.is_some() && !is_http_url(&self.member_lookup.url) {
            return Err(ConfigError::Invalid(format!(
                "member lookup url must be http(s): {}",
                self.member_lookup.url
            )));
        }

        Ok(())
    }

    /// Listener address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Server key material
#[derive(Clone, Default)]
pub struct KeyConfig {
    /// PEM private key, possibly with escaped newlines or without armor
    pub private_key_pem: String,
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfig")
            .field("private_key_pem", &redact(&self.private_key_pem))
            .finish()
    }
}

/// Directory service client configuration
#[derive(Clone)]
pub struct DirectoryConfig {
    /// Base URL; lookup paths are appended
    pub base_url: String,
    /// API key value
    pub api_key: String,
    /// Header carrying the API key
    pub api_key_header: String,
    /// Client-side deadline per upstream call
    pub timeout: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.abtyp.org/v0".to_string(),
            api_key: String::new(),
            api_key_header: "api-Key".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("api_key_header", &self.api_key_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Flow behaviour
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Identifier used when the token is missing or a placeholder
    pub default_identifier: String,
    /// Country dialling prefix stripped from long tokens
    pub country_code: String,
    /// Digits in a bare local number
    pub local_number_length: usize,
    /// Tokens sent by builder previews and test harnesses
    pub placeholder_tokens: Vec<String>,
    /// Single entry substituted for an empty fetched list; `None` disables it
    pub empty_list_placeholder: Option<LookupItem>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            default_identifier: "8488861504".to_string(),
            country_code: "91".to_string(),
            local_number_length: 10,
            placeholder_tokens: vec!["flows-builder-preview".to_string()],
            empty_list_placeholder: Some(LookupItem::new("0", "Not Available")),
        }
    }
}

/// Signature-verified member lookup
#[derive(Clone)]
pub struct MemberLookupConfig {
    /// HMAC secret; the route is mounted only when set
    pub app_secret: Option<String>,
    /// Member lookup service URL
    pub url: String,
}

impl Default for MemberLookupConfig {
    fn default() -> Self {
        Self {
            app_secret: None,
            url: "https://utkarshjain.com/abtypchatbot/get_member.php".to_string(),
        }
    }
}

impl fmt::Debug for MemberLookupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberLookupConfig")
            .field("app_secret", &self.app_secret.as_deref().map(redact))
            .field("url", &self.url)
            .finish()
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable not set
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    /// Variable set but not parseable
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn parse_var<T, F>(var: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

fn parse_flag<F>(var: &F, name: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                reason: format!("expected a boolean, got {other:?}"),
            }),
        })
        .transpose()
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        REDACTED
    }
}
