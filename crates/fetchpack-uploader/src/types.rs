//! Core types for the uploader service

use serde::Serialize;

/// Configuration for the uploader service
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub port: u16,
    pub upload_api_url: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            port: 3004,
            upload_api_url: "https://tmpfiles.org/api/v1/upload".to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

/// Response for a relayed file
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub url: String,
    pub file_name: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UploaderConfig::default();
        assert_eq!(config.port, 3004);
        assert!(config.upload_api_url.contains("tmpfiles.org"));
    }

    #[test]
    fn test_relay_response_serialization() {
        let response = RelayResponse {
            url: "https://tmpfiles.org/dl/1/a.bin".to_string(),
            file_name: "a.bin".to_string(),
            size: 7,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("dl/1/a.bin"));
        assert!(json.contains("\"size\":7"));
    }
}
