//! HTTP server for the zip service endpoints
//!
//! Provides /health, /zip, /create and /download/{key}.

use crate::archive::zip_single_entry;
use crate::error::{Result, ZipperError};
use crate::types::{CreateResponse, HealthResponse};
use artifact_store::{ArtifactStore, KeyPolicy, StoreError};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use remote_fetch::{FetchError, RemoteFetcher};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use url::Url;

/// Shared state for the HTTP server
pub struct ServerState {
    pub store: ArtifactStore,
    pub fetcher: RemoteFetcher,
    pub artifact_dir: PathBuf,
    pub key_policy: KeyPolicy,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(
        store: ArtifactStore,
        fetcher: RemoteFetcher,
        artifact_dir: PathBuf,
        key_policy: KeyPolicy,
    ) -> Self {
        Self {
            store,
            fetcher,
            artifact_dir,
            key_policy,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Deserialize)]
pub struct UrlQuery {
    url: Option<String>,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/zip", get(zip_direct))
        .route("/create", get(create_archive))
        .route("/download/{key}", get(download))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store_stats = state.store.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        store: store_stats,
    })
}

/// Fetch a remote file and return it directly as a single-entry zip
async fn zip_direct(State(state): State<SharedState>, Query(query): Query<UrlQuery>) -> Response {
    let Some(url) = query.url else {
        return missing_url_response();
    };

    match fetch_and_zip(&state, &url).await {
        Ok((zip_name, data)) => attachment_response(&zip_name, data),
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to zip remote file");
            error_response(&e)
        }
    }
}

/// Fetch a remote file, package it and register it under a derived key,
/// reusing an existing unexpired artifact when the key policy allows
async fn create_archive(
    State(state): State<SharedState>,
    Query(query): Query<UrlQuery>,
) -> Response {
    let Some(url) = query.url else {
        return missing_url_response();
    };

    // Expired-entry cleanup rides on every create request.
    state.store.sweep().await;

    match materialize(&state, &url).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to create archive");
            error_response(&e)
        }
    }
}

/// Serve a stored artifact by key
async fn download(State(state): State<SharedState>, Path(key): Path<String>) -> Response {
    match state.store.open(&key).await {
        Ok(Some((record, mut file))) => {
            let mut data = Vec::new();
            if let Err(e) = file.read_to_end(&mut data).await {
                error!(key = %key, error = %e, "Failed to read artifact");
                return internal_error_response();
            }
            attachment_response(&record.display_name, data)
        }
        Ok(None) => not_found_response(),
        Err(StoreError::Vanished(_)) => {
            // Expiry deleted the file out from under a live record; the
            // caller sees the same 404 as for an expired key.
            warn!(key = %key, "Artifact vanished before retrieval");
            not_found_response()
        }
        Err(e) => {
            error!(key = %key, error = %e, "Failed to open artifact");
            internal_error_response()
        }
    }
}

/// Fetch `url` to a staging temp file and package it as a zip held in a
/// second temp file, returning the archive name and bytes. Both temp
/// files are cleaned up on drop.
async fn fetch_and_zip(state: &ServerState, url: &str) -> Result<(String, Vec<u8>)> {
    let remote = state.fetcher.fetch(url).await?;
    let source_name = remote.file_name.clone();
    let zip_name = zip_file_name(&source_name);

    let staging = tempfile::NamedTempFile::new()?;
    let staging_path = staging.path().to_path_buf();
    remote.save_to(&staging_path).await?;

    let packaged = tempfile::NamedTempFile::new()?;
    let packaged_path = packaged.path().to_path_buf();
    zip_single_entry(&staging_path, &packaged_path, &source_name).await?;

    let data = tokio::fs::read(&packaged_path).await?;
    Ok((zip_name, data))
}

/// The /create pipeline: reuse check, then fetch, archive and put.
async fn materialize(state: &ServerState, url: &str) -> Result<CreateResponse> {
    let parsed = Url::parse(url)
        .map_err(|e| ZipperError::Fetch(FetchError::InvalidUrl(e.to_string())))?;
    let source_name = remote_fetch::file_name_from_url(&parsed);
    let zip_name = zip_file_name(&source_name);
    let key = state.key_policy.derive_key(&zip_name);

    // Random keys are fresh per request, so only the name-derived policy
    // can hit an existing artifact.
    if state.key_policy == KeyPolicy::DerivedName {
        if let Some(record) = state.store.try_get(&key).await {
            info!(key = %key, "Reusing existing artifact");
            let size = tokio::fs::metadata(&record.path)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            return Ok(CreateResponse {
                download_path: format!("/download/{}", record.key),
                key: record.key,
                file_name: record.display_name,
                size,
                reused: true,
            });
        }
    }

    let remote = state.fetcher.fetch(url).await?;
    let staging = tempfile::NamedTempFile::new()?;
    let staging_path = staging.path().to_path_buf();
    remote.save_to(&staging_path).await?;

    let artifact_path = state.artifact_dir.join(&key);
    let size = zip_single_entry(&staging_path, &artifact_path, &source_name).await?;

    let record = state.store.put(&key, artifact_path, &zip_name).await?;
    info!(key = %record.key, size, "Created artifact");

    Ok(CreateResponse {
        download_path: format!("/download/{}", record.key),
        key: record.key,
        file_name: record.display_name,
        size,
        reused: false,
    })
}

/// Archive name shown to the client: the source name with a .zip suffix.
fn zip_file_name(source_name: &str) -> String {
    if source_name.to_ascii_lowercase().ends_with(".zip") {
        source_name.to_string()
    } else {
        format!("{}.zip", source_name)
    }
}

fn attachment_response(file_name: &str, data: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Body::from(data))
        .unwrap()
}

fn missing_url_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "URL parameter is required".to_string(),
        }),
    )
        .into_response()
}

fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "File not found or expired".to_string(),
        }),
    )
        .into_response()
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

fn error_response(err: &ZipperError) -> Response {
    match err {
        ZipperError::Fetch(FetchError::InvalidUrl(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid URL".to_string(),
            }),
        )
            .into_response(),
        ZipperError::Fetch(FetchError::UpstreamStatus(status)) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Upstream returned status {}", status),
            }),
        )
            .into_response(),
        ZipperError::Fetch(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Failed to fetch remote file".to_string(),
            }),
        )
            .into_response(),
        ZipperError::Store(StoreError::Vanished(_)) => not_found_response(),
        _ => internal_error_response(),
    }
}
