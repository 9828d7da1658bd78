//! Core error types for `fnicon`.

use thiserror::Error;

/// Core error type for `fnicon` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record is missing a required field or carries an invalid value.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
