//! # Flow Telemetry
//!
//! Structured logging for the flow endpoint.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flow_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FLOW_SERVICE_NAME` | `flow-endpoint` | Service name in logs |
//! | `FLOW_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `FLOW_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `FLOW_LOG_SOURCE` | `false` | Include file and line |
//! | `FLOW_ENV` | `dev` | Deployment environment |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log level directive could not be parsed
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed, or installation failed
    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Initialize logging for the process.
///
/// Call once, before any other component logs.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}
