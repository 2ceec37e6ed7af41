//! Error types for the artifact store

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// The backing file could not be verified or written into place.
    StorageWrite(Box<std::io::Error>),
    /// A record's backing file disappeared before it could be served.
    Vanished(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::StorageWrite(err) => write!(f, "Storage write error: {}", err),
            StoreError::Vanished(key) => write!(f, "Artifact vanished: {}", key),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::StorageWrite(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::StorageWrite(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
