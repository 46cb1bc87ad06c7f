// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the proximity pipeline.

use std::fmt;

/// Result type alias for proximity operations.
pub type Result<T> = std::result::Result<T, ProximityError>;

/// Main error type for the proximity library.
#[derive(Debug)]
pub enum ProximityError {
    /// Detector output tensor does not match the configured layout.
    InvalidInputShape(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Malformed JSON (configuration file or recorded frame).
    ParseError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for ProximityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInputShape(msg) => write!(f, "Invalid input shape: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for ProximityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ProximityError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ProximityError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
