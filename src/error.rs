//! Error types for the feedback monitor
//!
//! This module provides error handling using thiserror for structured error
//! definitions and anyhow for error propagation in the binary.

use thiserror::Error;

/// Main error type for feedback monitor operations
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// Persistence layer cannot be reached or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Feedback record not found
    #[error("Feedback record not found: {0}")]
    NotFound(i64),

    /// Missing or mistyped fields in a submission
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Token gate rejected the request
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Classification model is not loaded
    #[error("Model unavailable")]
    ModelUnavailable,

    /// Classification model failed on an input
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for feedback monitor operations
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Convert anyhow::Error to FeedbackError
impl From<anyhow::Error> for FeedbackError {
    fn from(err: anyhow::Error) -> Self {
        FeedbackError::Other(err.to_string())
    }
}

impl From<rusqlite::Error> for FeedbackError {
    fn from(err: rusqlite::Error) -> Self {
        FeedbackError::StorageUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeedbackError::NotFound(999);
        assert_eq!(err.to_string(), "Feedback record not found: 999");
    }

    #[test]
    fn test_sqlite_error_is_storage_unavailable() {
        let err: FeedbackError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, FeedbackError::StorageUnavailable(_)));
    }
}
