//! Core types for the encoder service

use serde::Serialize;

/// Configuration for the encoder service
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub port: u16,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { port: 3002 }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(EncoderConfig::default().port, 3002);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            uptime_secs: 42,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("42"));
    }
}
