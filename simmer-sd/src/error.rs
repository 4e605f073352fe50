//! Error types for simmer-sd
//!
//! Module-specific error types using thiserror for clear error propagation.
//! Session-engine errors are all recoverable: operations on absent sessions
//! are silent no-ops, and a start conflict surfaces as a dismissable notice
//! (HTTP 409), never a process failure.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the simmer-sd session daemon
#[derive(Error, Debug)]
pub enum Error {
    /// Shared-crate errors (validation, JSON, lookup)
    #[error(transparent)]
    Common(#[from] simmer_common::Error),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A different recipe's session is already active
    #[error("Another session is already active (recipe {active})")]
    SessionConflict { active: Uuid },

    /// Recipe lookup failed
    #[error("Recipe not found: {0}")]
    RecipeNotFound(Uuid),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the simmer-sd Error
pub type Result<T> = std::result::Result<T, Error>;
