//! # AppError
//!
//! Centralized error handling for the Pigeon Board ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all pn-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or missing input (e.g., bad fingerprint, empty post)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A uniqueness constraint blocked the action. Terminal, not a bug.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found (e.g., Post)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Backend failure. The message is for logs only.
    #[error("store error: {0}")]
    Store(String),

    /// Client-observed failure to reach the server, or a timeout.
    #[error("network error: {0}")]
    Network(String),
}

impl AppError {
    /// Whether the user may sensibly retry the same action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Store(_) | AppError::Network(_))
    }
}

/// A specialized Result type for Pigeon Board logic.
pub type Result<T> = std::result::Result<T, AppError>;
