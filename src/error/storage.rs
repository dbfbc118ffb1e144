//! Errors raised by key-value persistence.

use std::path::PathBuf;
use thiserror::Error;

use super::category::ErrorCategory;

/// Failure reading or writing a persisted blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("Failed to {operation} {}: {message}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        message: String,
    },

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing store refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        StorageError::Io {
            operation,
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StorageError::Io { .. } | StorageError::Unavailable(_) => ErrorCategory::System,
            StorageError::Serialization(_) => ErrorCategory::Client,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
