//! Pull-through gem cache

use async_trait::async_trait;
use gem_proxy::{HeaderMap, UpstreamFetcher};
use gem_storage::{Properties, StorageBackend, StorageError, StoredGem};
use http::header;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::dispatch::{GemFetchStrategy, Outcome};
use crate::endpoint::Endpoint;
use crate::error::CoreError;
use crate::upstream::Upstream;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upstream headers preserved with a cached gem, besides type and length
const PRESERVED_HEADERS: [header::HeaderName; 2] = [header::ETAG, header::LAST_MODIFIED];

/// Serves gems from the store, populating it from upstream on a miss
///
/// There is no cross-request locking: two concurrent misses for the same
/// gem may both fetch and save it. Released gems never change, so both
/// writes carry the same bytes.
pub struct GemCache {
    storage: Arc<dyn StorageBackend>,
    fetcher: Arc<dyn UpstreamFetcher>,
}

impl GemCache {
    pub fn new(storage: Arc<dyn StorageBackend>, fetcher: Arc<dyn UpstreamFetcher>) -> Self {
        Self { storage, fetcher }
    }

    /// Get a gem, fetching and storing it if it is not cached yet
    pub async fn fetch_gem(&self, upstream: &Upstream, id: &str) -> Result<StoredGem, CoreError> {
        if self.storage.exists(id).await? {
            match self.storage.load(id).await {
                Ok(gem) => {
                    info!("Gem {} exists, returning cached", id);
                    metrics::counter!("gem_cache_hits_total").increment(1);
                    return Ok(gem);
                }
                Err(StorageError::NotFound(_)) => {
                    warn!("Gem {} disappeared from storage, fetching again", id);
                }
                Err(e) => return Err(CoreError::Storage(e)),
            }
        }

        info!("Gem {} is not cached, fetching from {}", id, upstream);
        metrics::counter!("gem_cache_misses_total").increment(1);
        self.fetch_remote_gem(upstream, id).await
    }

    async fn fetch_remote_gem(&self, upstream: &Upstream, id: &str) -> Result<StoredGem, CoreError> {
        let url = upstream.url(&Endpoint::GemFetch.path(Some(id)), None);

        let fetched = match self.fetcher.get(&url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Failed to fetch gem {} from {}: {}", id, upstream, e);
                metrics::counter!("gem_cache_upstream_errors_total").increment(1);
                return Err(CoreError::Proxy(e));
            }
        };

        let properties = capture_properties(&fetched.headers, fetched.body.len());

        if let Err(e) = self
            .storage
            .save(id, fetched.body.clone(), &properties)
            .await
        {
            error!(
                "Failed to store gem {} at {}: {}",
                id,
                self.storage.storage_path(id),
                e
            );
            return Err(CoreError::Storage(e));
        }

        info!("Cached gem {} ({} bytes)", id, fetched.body.len());
        Ok(StoredGem {
            content: fetched.body,
            properties,
        })
    }
}

#[async_trait]
impl GemFetchStrategy for GemCache {
    async fn serve_gem(
        &self,
        upstream: &Upstream,
        id: &str,
        _query: Option<&str>,
    ) -> Result<Outcome, CoreError> {
        Ok(Outcome::Gem(self.fetch_gem(upstream, id).await?))
    }
}

/// Select the response metadata stored with a gem
///
/// `content-length` is the length of the bytes actually received.
pub fn capture_properties(headers: &HeaderMap, length: usize) -> Properties {
    let mut properties = Properties::new();

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    properties.insert(header::CONTENT_TYPE.to_string(), content_type.to_string());
    properties.insert(header::CONTENT_LENGTH.to_string(), length.to_string());

    for name in PRESERVED_HEADERS {
        if let Some(value) = headers.get(&name).and_then(|h| h.to_str().ok()) {
            properties.insert(name.to_string(), value.to_string());
        }
    }

    properties
}
