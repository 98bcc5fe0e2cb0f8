//! Secure file sync error types.

use thiserror::Error;

/// Result type for secure file operations.
pub type SecureFilesResult<T> = Result<T, SecureFilesError>;

/// Errors that can occur while listing, downloading or deleting secure files.
#[derive(Debug, Error)]
pub enum SecureFilesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {status} for {url}")]
    Api { status: u16, url: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid secure file name: {0:?}")]
    InvalidName(String),

    /// The downloaded bytes do not hash to the recorded checksum. The file is
    /// left on disk for inspection and must not be trusted.
    #[error("checksum validation failed for {name}: expected {expected}, got {actual}")]
    IntegrityFailure {
        name: String,
        expected: String,
        actual: String,
    },
}

impl SecureFilesError {
    /// Returns true for errors the caller must treat as unrecoverable.
    ///
    /// Only integrity failures qualify: a tampered or corrupted credential
    /// must halt the process instead of being skipped like a transport error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::IntegrityFailure { .. })
    }
}
