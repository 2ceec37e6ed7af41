//! HTTP server for the relay endpoints
//!
//! Provides /health and /upload.

use crate::error::UploaderError;
use crate::host::HostClient;
use crate::types::{HealthResponse, RelayResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use remote_fetch::{FetchError, RemoteFetcher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub fetcher: RemoteFetcher,
    pub host: HostClient,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(fetcher: RemoteFetcher, host: HostClient) -> Self {
        Self {
            fetcher,
            host,
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
        .route("/upload", get(relay))
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
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
    })
}

/// Fetch a remote file and re-host it on the ephemeral file host
async fn relay(State(state): State<SharedState>, Query(query): Query<UrlQuery>) -> Response {
    let Some(url) = query.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "URL parameter is required".to_string(),
            }),
        )
            .into_response();
    };

    match fetch_and_rehost(&state, &url).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to relay remote file");
            error_response(&e)
        }
    }
}

/// The relay pipeline: download fully, then hand off to the host. The
/// host's multipart API needs the whole body, so there is no streaming
/// handoff here.
async fn fetch_and_rehost(
    state: &ServerState,
    url: &str,
) -> crate::error::Result<RelayResponse> {
    let remote = state.fetcher.fetch(url).await?;
    let file_name = remote.file_name.clone();
    let data = remote.bytes().await?.to_vec();
    let size = data.len() as u64;

    let hosted_url = state.host.upload(data, &file_name).await?;
    info!(file_name = %file_name, size, hosted_url = %hosted_url, "Relayed file");

    Ok(RelayResponse {
        url: hosted_url,
        file_name,
        size,
    })
}

fn error_response(err: &UploaderError) -> Response {
    match err {
        UploaderError::Fetch(FetchError::InvalidUrl(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid URL".to_string(),
            }),
        )
            .into_response(),
        UploaderError::Fetch(FetchError::UpstreamStatus(status)) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Upstream returned status {}", status),
            }),
        )
            .into_response(),
        UploaderError::Fetch(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Failed to fetch remote file".to_string(),
            }),
        )
            .into_response(),
        UploaderError::Http(_) | UploaderError::Host(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "File host unavailable".to_string(),
            }),
        )
            .into_response(),
        UploaderError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response(),
    }
}
