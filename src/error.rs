//! Error types for PureMark
//!
//! Provides standardized error handling across the store, the HTTP layer and
//! the client session.

use thiserror::Error;

/// Errors that can occur in PureMark
#[derive(Debug, Error)]
pub enum MarkError {
    /// Rejected input (bad feedback payload, invalid URL, invalid tag)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced bookmark does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bookmark with the same URL already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation disabled by configuration
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Store errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Transport errors talking to the API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API
    #[error("Server responded {status}: {message}")]
    Remote { status: u16, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for PureMark operations
pub type MarkResult<T> = Result<T, MarkError>;
