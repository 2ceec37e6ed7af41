//! Error types for the zip service

use std::fmt;

#[derive(Debug)]
pub enum ZipperError {
    Fetch(remote_fetch::FetchError),
    Store(artifact_store::StoreError),
    Archive(zip::result::ZipError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ZipperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZipperError::Fetch(err) => write!(f, "Fetch error: {}", err),
            ZipperError::Store(err) => write!(f, "Store error: {}", err),
            ZipperError::Archive(err) => write!(f, "Archive error: {}", err),
            ZipperError::Io(err) => write!(f, "IO error: {}", err),
            ZipperError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ZipperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZipperError::Fetch(err) => Some(err),
            ZipperError::Store(err) => Some(err),
            ZipperError::Archive(err) => Some(err),
            ZipperError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<remote_fetch::FetchError> for ZipperError {
    fn from(err: remote_fetch::FetchError) -> Self {
        ZipperError::Fetch(err)
    }
}

impl From<artifact_store::StoreError> for ZipperError {
    fn from(err: artifact_store::StoreError) -> Self {
        ZipperError::Store(err)
    }
}

impl From<zip::result::ZipError> for ZipperError {
    fn from(err: zip::result::ZipError) -> Self {
        ZipperError::Archive(err)
    }
}

impl From<std::io::Error> for ZipperError {
    fn from(err: std::io::Error) -> Self {
        ZipperError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ZipperError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ZipperError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ZipperError>;
