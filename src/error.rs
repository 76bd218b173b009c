//! Error handling for the patrol capture core

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input validation error (rejected before any network call)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Classification failure: transport error, non-success response,
    /// or malformed classification payload
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Storage error (quota exceeded etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error came out of the classification path
    pub fn is_classification(&self) -> bool {
        matches!(self, Error::Classification(_))
    }
}
