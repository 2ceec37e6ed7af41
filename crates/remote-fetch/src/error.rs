//! Error types for the download client

use std::fmt;

#[derive(Debug)]
pub enum FetchError {
    InvalidUrl(String),
    Http(Box<reqwest::Error>),
    UpstreamStatus(u16),
    Io(Box<std::io::Error>),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            FetchError::Http(err) => write!(f, "HTTP error: {}", err),
            FetchError::UpstreamStatus(status) => {
                write!(f, "Upstream returned status {}", status)
            }
            FetchError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err.as_ref()),
            FetchError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(Box::new(err))
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_display() {
        let err = FetchError::InvalidUrl("empty host".to_string());
        assert_eq!(format!("{}", err), "Invalid URL: empty host");
    }

    #[test]
    fn test_upstream_status_display() {
        let err = FetchError::UpstreamStatus(404);
        assert_eq!(format!("{}", err), "Upstream returned status 404");
    }

    #[test]
    fn test_error_is_debug() {
        let err = FetchError::UpstreamStatus(500);
        assert!(format!("{:?}", err).contains("UpstreamStatus"));
    }
}
