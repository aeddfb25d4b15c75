//! Common error types used throughout reelvault.
//!
//! Every crate funnels catalog, storage, and streaming failures into [`Error`],
//! which carries enough context for the HTTP layer to pick a status code via
//! [`Error::http_status`].

use std::path::PathBuf;

/// Common error type for reelvault.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested record or file does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "file").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Invalid input was provided (bad id, missing upload field, unsupported MIME).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An upload exceeded the configured size limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The configured storage backend has no implementation.
    #[error("Unsupported storage backend: {0}")]
    UnsupportedBackend(String),

    /// Loading or persisting the catalog failed.
    #[error("Storage error at {}: {message}", path.display())]
    Storage {
        /// The backing file involved.
        path: PathBuf,
        /// Human-readable description of the failure.
        message: String,
    },

    /// Reading a file for a streaming response failed.
    #[error("Stream error: {0}")]
    Stream(std::io::Error),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Storage error for the given backing file.
    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidInput(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::UnsupportedBackend(_)
            | Self::Storage { .. }
            | Self::Stream(_)
            | Self::Io(_)
            | Self::Internal(_) => 500,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
