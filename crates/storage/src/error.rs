//! Error types for the storage layer.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted data exists but could not be parsed.
    ///
    /// Session reads recover from this by treating the value as absent.
    #[error("corrupt value for key '{key}': {message}")]
    Parse { key: String, message: String },
}

impl StorageError {
    /// Builds a [`StorageError::Parse`] for the given key.
    pub fn parse(key: impl Into<String>, message: impl ToString) -> Self {
        StorageError::Parse {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Returns `true` if this error describes corrupt persisted data.
    pub fn is_parse(&self) -> bool {
        matches!(self, StorageError::Parse { .. })
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
