//! Fetchpack encoder - base64 passthrough service
//!
//! Fetches a remote file by URL and streams it back as base64 text, for
//! clients that can only consume textual payloads.

mod encode;
mod error;
mod server;
mod types;

use crate::error::{EncoderError, Result};
use crate::server::{start_server, ServerState, SharedState};
use crate::types::EncoderConfig;
use remote_fetch::RemoteFetcher;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("fetchpack_encoder=info".parse()?);

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

    info!("Starting fetchpack encoder...");

    let config = load_config();
    info!("Port: {}", config.port);

    let state: SharedState = Arc::new(ServerState::new(RemoteFetcher::new()));

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| EncoderError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

fn load_config() -> EncoderConfig {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or_else(|| EncoderConfig::default().port);

    EncoderConfig { port }
}
