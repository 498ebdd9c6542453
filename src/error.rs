//! Error types for versicle.

use thiserror::Error;

/// The main error type for versicle operations.
#[derive(Error, Debug)]
pub enum VersicleError {
    /// I/O errors from the storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors for stored index values.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed or unreadable index data.
    #[error("Index error: {0}")]
    Index(String),

    /// A search was requested with a strategy name that does not exist.
    #[error("Unknown search strategy: {0}")]
    UnknownStrategy(String),
}

impl VersicleError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        VersicleError::InvalidArgument(msg.into())
    }

    pub fn index<S: Into<String>>(msg: S) -> Self {
        VersicleError::Index(msg.into())
    }

    pub fn unknown_strategy<S: Into<String>>(name: S) -> Self {
        VersicleError::UnknownStrategy(name.into())
    }
}

/// Result type alias for versicle operations.
pub type Result<T> = std::result::Result<T, VersicleError>;
