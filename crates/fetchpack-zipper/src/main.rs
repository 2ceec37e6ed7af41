//! Fetchpack zipper - zip packaging service
//!
//! Fetches a remote file by URL and re-exposes it as a single-entry zip
//! archive, either returned directly or registered under a keyed download
//! link with a bounded retention window.

mod archive;
mod error;
mod server;
mod types;

use crate::error::{Result, ZipperError};
use crate::server::{start_server, ServerState, SharedState};
use crate::types::ZipperConfig;
use artifact_store::{ArtifactStore, KeyPolicy, DEFAULT_TTL_SECS};
use remote_fetch::RemoteFetcher;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("fetchpack_zipper=info".parse()?);

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

    info!("Starting fetchpack zipper...");

    let config = load_config();
    info!("Port: {}", config.port);
    info!("Artifact dir: {:?}", config.artifact_dir);
    info!("Artifact TTL: {} seconds", config.ttl_secs);
    info!("Key policy: {:?}", config.key_policy);

    tokio::fs::create_dir_all(&config.artifact_dir).await?;

    let store = ArtifactStore::new(config.ttl_secs);
    let fetcher = RemoteFetcher::new();

    let state: SharedState = Arc::new(ServerState::new(
        store,
        fetcher,
        config.artifact_dir.clone(),
        config.key_policy,
    ));

    // Eviction is request-driven by default; a periodic pass bounds disk
    // growth across idle stretches when configured.
    if let Some(secs) = config.sweep_interval_secs {
        let sweep_state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            loop {
                interval.tick().await;
                let removed = sweep_state.store.sweep().await;
                if removed > 0 {
                    info!(removed, "Periodic sweep evicted expired artifacts");
                }
            }
        });
        info!(interval_secs = secs, "Periodic sweep enabled");
    }

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| ZipperError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

fn load_config() -> ZipperConfig {
    let defaults = ZipperConfig::default();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let artifact_dir = std::env::var("ARTIFACT_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.artifact_dir);

    let ttl_secs = std::env::var("ARTIFACT_TTL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TTL_SECS);

    let key_policy = std::env::var("KEY_POLICY")
        .map(|s| KeyPolicy::parse(&s))
        .unwrap_or(defaults.key_policy);

    let sweep_interval_secs = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok());

    ZipperConfig {
        port,
        artifact_dir,
        ttl_secs,
        key_policy,
        sweep_interval_secs,
    }
}
