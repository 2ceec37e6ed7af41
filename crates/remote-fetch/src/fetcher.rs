//! Remote file fetching

use crate::error::{FetchError, Result};
use bytes::Bytes;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

/// Upstream files can be large; allow five minutes per request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// HTTP client for streaming remote files
pub struct RemoteFetcher {
    client: reqwest::Client,
}

impl RemoteFetcher {
    /// Create a fetcher with the default five-minute timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Fetch `url` and validate the upstream status. The body is left
    /// unread; the returned [`RemoteFile`] streams it in bounded-size
    /// chunks.
    pub async fn fetch(&self, url: &str) -> Result<RemoteFile> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        debug!(url = %parsed, "Fetching remote file");
        let response = self.client.get(parsed.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, url = %parsed, "Upstream returned error status");
            return Err(FetchError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let content_length = response.content_length();
        let file_name = file_name_from_url(&parsed);

        debug!(
            file_name = %file_name,
            content_type = %content_type,
            content_length = ?content_length,
            "Remote file headers received"
        );

        Ok(RemoteFile {
            file_name,
            content_type,
            content_length,
            response,
        })
    }
}

impl Default for RemoteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// A fetched remote file whose body has not been consumed yet
pub struct RemoteFile {
    pub file_name: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    response: reqwest::Response,
}

impl RemoteFile {
    /// Next body chunk; `None` at end of stream.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.response.chunk().await?)
    }

    /// Stream the body to `path` chunk by chunk, returning the number of
    /// bytes written.
    pub async fn save_to(mut self, path: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;
        while let Some(chunk) = self.response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        debug!(path = ?path, written, "Saved remote file");
        Ok(written)
    }

    /// Read the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.response.bytes().await?)
    }
}

/// Derive a display filename from a URL: the last non-empty path segment,
/// percent-decoded, falling back to "download".
pub fn file_name_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
        .unwrap_or("");

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    if decoded.is_empty() {
        "download".to_string()
    } else {
        decoded
    }
}
