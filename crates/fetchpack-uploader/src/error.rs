//! Error types for the uploader service

use std::fmt;

#[derive(Debug)]
pub enum UploaderError {
    Fetch(remote_fetch::FetchError),
    Http(Box<reqwest::Error>),
    Host(String),
    Config(String),
}

impl fmt::Display for UploaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploaderError::Fetch(err) => write!(f, "Fetch error: {}", err),
            UploaderError::Http(err) => write!(f, "HTTP error: {}", err),
            UploaderError::Host(msg) => write!(f, "File host error: {}", msg),
            UploaderError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for UploaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploaderError::Fetch(err) => Some(err),
            UploaderError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<remote_fetch::FetchError> for UploaderError {
    fn from(err: remote_fetch::FetchError) -> Self {
        UploaderError::Fetch(err)
    }
}

impl From<reqwest::Error> for UploaderError {
    fn from(err: reqwest::Error) -> Self {
        UploaderError::Http(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for UploaderError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        UploaderError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UploaderError>;
