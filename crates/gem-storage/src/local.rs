//! Local disk storage backend

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{Properties, StorageBackend, StoredGem, key_digest, validate_key};
use crate::error::StorageError;

const CONTENT_FILE: &str = "content";
const PROPERTIES_FILE: &str = "properties.json";

/// Sidecar written next to each cached artifact
#[derive(Debug, Serialize, Deserialize)]
struct PropertiesFile {
    name: String,
    properties: Properties,
    stored_at: DateTime<Utc>,
}

/// Local disk storage backend
///
/// Stores each resource in a directory derived from the SHA256 of its identifier:
/// `<base_path>/gems/<first 2 chars>/<sha256>/{content,properties.json}`
pub struct LocalStorage {
    gems_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        let gems_path = base_path.join("gems");

        fs::create_dir_all(&gems_path).await?;

        info!("Initialized local storage at {:?}", base_path);

        Ok(Self { gems_path })
    }

    /// Get the directory holding a resource
    fn resource_dir(&self, id: &str) -> Result<PathBuf, StorageError> {
        validate_key(id)?;
        let hash = key_digest(id);
        let shard = &hash[..2];
        Ok(self.gems_path.join(shard).join(&hash))
    }

    /// Write a file atomically: unique temp name in the same directory, then rename
    async fn write_atomic(dir: &Path, file_name: &str, data: &[u8]) -> Result<(), StorageError> {
        let temp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }
        fs::rename(&temp_path, dir.join(file_name)).await?;
        Ok(())
    }
}

fn not_found(id: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(id.to_string())
    } else {
        StorageError::Io(e)
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        let path = self.resource_dir(id)?.join(CONTENT_FILE);
        Ok(fs::try_exists(&path).await?)
    }

    async fn load(&self, id: &str) -> Result<StoredGem, StorageError> {
        let dir = self.resource_dir(id)?;
        debug!("Reading resource {} from {:?}", id, dir);

        let content = fs::read(dir.join(CONTENT_FILE))
            .await
            .map_err(|e| not_found(id, e))?;
        let raw = fs::read(dir.join(PROPERTIES_FILE))
            .await
            .map_err(|e| not_found(id, e))?;
        let sidecar: PropertiesFile = serde_json::from_slice(&raw)?;

        Ok(StoredGem {
            content: Bytes::from(content),
            properties: sidecar.properties,
        })
    }

    async fn save(
        &self,
        id: &str,
        content: Bytes,
        properties: &Properties,
    ) -> Result<(), StorageError> {
        let dir = self.resource_dir(id)?;
        debug!("Writing resource {} ({} bytes) to {:?}", id, content.len(), dir);

        fs::create_dir_all(&dir).await?;

        let sidecar = PropertiesFile {
            name: id.to_string(),
            properties: properties.clone(),
            stored_at: Utc::now(),
        };
        let raw = serde_json::to_vec_pretty(&sidecar)?;

        // Content lands last: a visible content file implies its properties are in place
        Self::write_atomic(&dir, PROPERTIES_FILE, &raw).await?;
        Self::write_atomic(&dir, CONTENT_FILE, &content).await?;

        Ok(())
    }

    fn storage_path(&self, id: &str) -> String {
        self.resource_dir(id)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
