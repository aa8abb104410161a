//! Common error types for Lockbox.

use thiserror::Error;

/// Top-level error type for Lockbox operations.
#[derive(Debug, Error)]
pub enum Error {
    /// User-supplied values failed validation (e.g. confirmation mismatch).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password generator parameters are inconsistent.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Master passphrase verification failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that mark a security boundary. Callers must not retry past them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::Crypto(_))
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
