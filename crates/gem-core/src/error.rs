//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] gem_storage::StorageError),

    #[error("Proxy error: {0}")]
    Proxy(#[from] gem_proxy::ProxyError),

    #[error("Not found: {0}")]
    NotFound(String),
}
