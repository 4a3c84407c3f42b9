//! Flow endpoint server.
//!
//! All configuration comes from the environment; see
//! [`flow_endpoint::EndpointConfig::from_env`] and
//! [`flow_telemetry::TelemetryConfig::from_env`].

use anyhow::{Context, Result};
use flow_endpoint::{
    EndpointConfig, FlowEndpointService, HttpDirectory, HttpMemberLookup, VERSION,
};
use flow_telemetry::{init_telemetry, TelemetryConfig};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("failed to initialize logging")?;

    let config = EndpointConfig::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    info!(version = VERSION, addr = %config.http_addr(), "Starting flow endpoint");

    let directory = Arc::new(
        HttpDirectory::new(&config.directory).context("failed to build directory client")?,
    );

    let member_lookup = match config.member_lookup.app_secret {
        Some(_) => Some(
            HttpMemberLookup::new(&config.member_lookup, config.directory.timeout)
                .context("failed to build member lookup client")?,
        ),
        None => None,
    };

    let mut service = FlowEndpointService::new(config, directory)
        .context("failed to create flow endpoint")?;
    if let Some(lookup) = member_lookup {
        service = service.with_member_lookup(Arc::new(lookup));
    }

    service
        .run(shutdown_signal())
        .await
        .context("server terminated")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
