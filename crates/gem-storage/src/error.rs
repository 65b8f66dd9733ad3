//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid resource key: {0}")]
    InvalidKey(String),

    #[error("Invalid resource metadata: {0}")]
    InvalidMetadata(#[from] serde_json::Error),
}
