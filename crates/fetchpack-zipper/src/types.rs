//! Core types for the zip service

use artifact_store::{KeyPolicy, StoreStats, DEFAULT_TTL_SECS};
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for the zip service
#[derive(Debug, Clone)]
pub struct ZipperConfig {
    pub port: u16,
    pub artifact_dir: PathBuf,
    pub ttl_secs: u64,
    pub key_policy: KeyPolicy,
    /// Periodic sweep interval; `None` leaves eviction purely
    /// request-driven.
    pub sweep_interval_secs: Option<u64>,
}

impl Default for ZipperConfig {
    fn default() -> Self {
        Self {
            port: 3003,
            artifact_dir: PathBuf::from("./cache/artifacts"),
            ttl_secs: DEFAULT_TTL_SECS,
            key_policy: KeyPolicy::DerivedName,
            sweep_interval_secs: None,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub store: StoreStats,
}

/// Response for a created (or reused) keyed artifact
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub key: String,
    pub file_name: String,
    pub size: u64,
    pub reused: bool,
    pub download_path: String,
}
