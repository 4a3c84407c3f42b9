//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include file/line in log lines
    pub with_source_location: bool,

    /// Deployment environment (production, staging, dev)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "flow-endpoint".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_source_location: false,
            environment: "dev".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FLOW_SERVICE_NAME`: Service name (default: flow-endpoint)
    /// - `FLOW_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `FLOW_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `FLOW_LOG_SOURCE`: Include file/line (default: false)
    /// - `FLOW_ENV`: Environment name (default: dev)
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            var("KUBERNETES_SERVICE_HOST").is_some() || var("DOCKER_CONTAINER").is_some();
        let defaults = Self::default();

        Self {
            service_name: var("FLOW_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: var("FLOW_LOG_LEVEL")
                .or_else(|| var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: var("FLOW_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(is_container),

            with_source_location: var("FLOW_LOG_SOURCE")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.with_source_location),

            environment: var("FLOW_ENV").unwrap_or(defaults.environment),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
