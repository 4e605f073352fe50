//! Common error types for Simmer

use thiserror::Error;

/// Common result type for Simmer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across Simmer crates
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
