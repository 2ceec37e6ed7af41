//! Ephemeral file host client
//!
//! Targets the tmpfiles.org API shape: a multipart POST answered with a
//! JSON page URL, which converts to a direct download URL by inserting
//! `/dl/` after the host. Hosted files are retained for about an hour.

use crate::error::{Result, UploaderError};
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Upload response from the file host
#[derive(Debug, Deserialize)]
pub struct HostUploadResponse {
    pub status: String,
    pub data: HostUploadData,
}

#[derive(Debug, Deserialize)]
pub struct HostUploadData {
    pub url: String,
}

/// HTTP client for the file host's upload API
pub struct HostClient {
    client: reqwest::Client,
    api_url: String,
}

impl HostClient {
    pub fn new(api_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }

    /// Upload `data` under `file_name`, returning the direct download URL.
    pub async fn upload(&self, data: Vec<u8>, file_name: &str) -> Result<String> {
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| UploaderError::Host(format!("Invalid upload part: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        debug!(api_url = %self.api_url, file_name = %file_name, "Uploading to file host");
        let response = self
            .client
            .post(&self.api_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "File host rejected upload");
            return Err(UploaderError::Host(format!(
                "File host returned status {}",
                status
            )));
        }

        let body: HostUploadResponse = response.json().await?;
        if body.status != "success" {
            return Err(UploaderError::Host(format!(
                "File host reported status {}",
                body.status
            )));
        }

        Ok(to_download_url(&body.data.url))
    }
}

/// Rewrite the host's page URL into its direct download form.
///
/// `https://tmpfiles.org/123/file.dat` -> `https://tmpfiles.org/dl/123/file.dat`
pub fn to_download_url(url: &str) -> String {
    let rest = url
        .strip_prefix("http://tmpfiles.org/")
        .or_else(|| url.strip_prefix("https://tmpfiles.org/"));

    match rest {
        Some(rest) if rest.starts_with("dl/") => format!("https://tmpfiles.org/{}", rest),
        Some(rest) => format!("https://tmpfiles.org/dl/{}", rest),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_download_url_rewrites_page_url() {
        assert_eq!(
            to_download_url("http://tmpfiles.org/12345/report.zip"),
            "https://tmpfiles.org/dl/12345/report.zip"
        );
        assert_eq!(
            to_download_url("https://tmpfiles.org/12345/report.zip"),
            "https://tmpfiles.org/dl/12345/report.zip"
        );
    }

    #[test]
    fn test_to_download_url_keeps_dl_form() {
        assert_eq!(
            to_download_url("https://tmpfiles.org/dl/12345/report.zip"),
            "https://tmpfiles.org/dl/12345/report.zip"
        );
    }

    #[test]
    fn test_to_download_url_leaves_other_hosts_alone() {
        assert_eq!(
            to_download_url("https://example.com/12345/report.zip"),
            "https://example.com/12345/report.zip"
        );
    }

    #[test]
    fn test_host_response_deserialization() {
        let json = r#"{"status":"success","data":{"url":"http://tmpfiles.org/1/a.bin"}}"#;
        let response: HostUploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "success");
        assert_eq!(response.data.url, "http://tmpfiles.org/1/a.bin");
    }
}
