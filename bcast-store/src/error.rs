//! Storage error types.

use thiserror::Error;

/// Errors that can occur when loading or saving a collection.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<StorageError> for bcast_core::BcastError {
    fn from(e: StorageError) -> Self {
        bcast_core::BcastError::Storage(e.to_string())
    }
}
