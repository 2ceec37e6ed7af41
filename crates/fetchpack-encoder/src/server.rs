//! HTTP server for the base64 passthrough endpoints
//!
//! Provides /health and /enc.

use crate::encode::StreamEncoder;
use crate::types::HealthResponse;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream;
use futures_util::Stream;
use remote_fetch::{FetchError, RemoteFetcher, RemoteFile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub fetcher: RemoteFetcher,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(fetcher: RemoteFetcher) -> Self {
        Self {
            fetcher,
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
        .route("/enc", get(encode_remote))
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

/// Stream a remote file back as one contiguous base64 document
async fn encode_remote(
    State(state): State<SharedState>,
    Query(query): Query<UrlQuery>,
) -> Response {
    let Some(url) = query.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "URL parameter is required".to_string(),
            }),
        )
            .into_response();
    };

    let remote = match state.fetcher.fetch(&url).await {
        Ok(remote) => remote,
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to fetch remote file");
            return fetch_error_response(&e);
        }
    };

    info!(
        file_name = %remote.file_name,
        content_length = ?remote.content_length,
        "Encoding remote file"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(encode_stream(remote)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

enum EncodeState {
    Streaming(Box<RemoteFile>, StreamEncoder),
    Done,
}

/// Base64 output aligned on 3-byte input boundaries; the carried tail is
/// flushed with padding once the upstream body ends.
fn encode_stream(remote: RemoteFile) -> impl Stream<Item = Result<Bytes, FetchError>> {
    let initial = EncodeState::Streaming(Box::new(remote), StreamEncoder::new());
    stream::unfold(initial, |state| async move {
        match state {
            EncodeState::Streaming(mut remote, mut encoder) => match remote.chunk().await {
                Ok(Some(chunk)) => {
                    let encoded = encoder.update(&chunk);
                    Some((
                        Ok(Bytes::from(encoded)),
                        EncodeState::Streaming(remote, encoder),
                    ))
                }
                Ok(None) => Some((Ok(Bytes::from(encoder.finish())), EncodeState::Done)),
                Err(e) => Some((Err(e), EncodeState::Done)),
            },
            EncodeState::Done => None,
        }
    })
}

fn fetch_error_response(err: &FetchError) -> Response {
    match err {
        FetchError::InvalidUrl(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid URL".to_string(),
            }),
        )
            .into_response(),
        FetchError::UpstreamStatus(status) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Upstream returned status {}", status),
            }),
        )
            .into_response(),
        _ => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Failed to fetch remote file".to_string(),
            }),
        )
            .into_response(),
    }
}
