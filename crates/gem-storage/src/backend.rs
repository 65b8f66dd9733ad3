//! Storage backend trait

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

use crate::error::StorageError;

/// Response metadata preserved alongside an artifact (lowercase header name -> value)
pub type Properties = BTreeMap<String, String>;

/// An artifact as held by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGem {
    pub content: Bytes,
    pub properties: Properties,
}

/// Storage backend trait
///
/// Resources are addressed by an opaque identifier (usually `name-version.gem`).
/// Entries are created once and never modified by the caching proxy; concurrent
/// saves of the same identifier must leave one complete entry behind.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Check if a resource exists
    async fn exists(&self, id: &str) -> Result<bool, StorageError>;

    /// Load a resource's content and properties
    async fn load(&self, id: &str) -> Result<StoredGem, StorageError>;

    /// Save a resource's content and properties
    async fn save(&self, id: &str, content: Bytes, properties: &Properties)
    -> Result<(), StorageError>;

    /// Location of a resource, for logging
    fn storage_path(&self, id: &str) -> String;
}

/// Reject identifiers that cannot name a resource
pub fn validate_key(id: &str) -> Result<(), StorageError> {
    if id.is_empty() {
        return Err(StorageError::InvalidKey("empty identifier".to_string()));
    }
    if id.contains('\0') {
        return Err(StorageError::InvalidKey(format!("{:?}", id)));
    }
    Ok(())
}

/// Compute the hex SHA256 of a resource identifier
pub fn key_digest(id: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hex::encode(hasher.finalize())
}
