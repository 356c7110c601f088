//! Error types for eventra.

use thiserror::Error;

/// Result type alias using eventra's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for eventra operations.
///
/// Variants map one-to-one onto the HTTP taxonomy the API layer exposes:
/// Validation → 400, Unauthorized → 401, Forbidden → 403, NotFound → 404,
/// Conflict → 409, everything else → 500.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed input, or a domain rule violation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing/invalid/expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (role or ownership mismatch)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unique constraint violation (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Assist/generation backend failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// Validation error listing the fields that must be filled in before an
    /// event can leave draft status.
    pub fn missing_event_fields(missing: &[&str]) -> Self {
        Error::Validation(format!(
            "The following fields are required to finalize the event: {}",
            missing.join(", ")
        ))
    }
}
