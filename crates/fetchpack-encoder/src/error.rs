//! Error types for the encoder service

use std::fmt;

#[derive(Debug)]
pub enum EncoderError {
    Config(String),
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for EncoderError {}

impl From<tracing_subscriber::filter::ParseError> for EncoderError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        EncoderError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EncoderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = EncoderError::Config("bad directive".to_string());
        assert_eq!(format!("{}", err), "Configuration error: bad directive");
    }
}
