//! Fetchpack uploader - ephemeral file host relay
//!
//! Fetches a remote file by URL, re-uploads it to a third-party ephemeral
//! file host and returns the host's direct download URL.

mod error;
mod host;
mod server;
mod types;

use crate::error::{Result, UploaderError};
use crate::host::HostClient;
use crate::server::{start_server, ServerState, SharedState};
use crate::types::UploaderConfig;
use remote_fetch::RemoteFetcher;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("fetchpack_uploader=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting fetchpack uploader...");

    let config = load_config();
    info!("Port: {}", config.port);
    info!("Upload API: {}", config.upload_api_url);

    let state: SharedState = Arc::new(ServerState::new(
        RemoteFetcher::new(),
        HostClient::new(&config.upload_api_url),
    ));

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| UploaderError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

fn load_config() -> UploaderConfig {
    let defaults = UploaderConfig::default();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let upload_api_url = std::env::var("UPLOAD_API_URL").unwrap_or(defaults.upload_api_url);

    UploaderConfig {
        port,
        upload_api_url,
    }
}
