//! Error types for project persistence.

use thiserror::Error;

use crate::error::EngineError;

/// Errors that can occur while reading or writing project payloads.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload content violates the data model
    #[error("Invalid project data: {0}")]
    Engine(#[from] EngineError),

    /// Invalid format structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Version mismatch between expected and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version string
        expected: String,
        /// Found version string
        found: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
