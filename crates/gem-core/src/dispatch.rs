//! Shared endpoint dispatch for all gem sources

use async_trait::async_trait;
use gem_storage::StoredGem;
use http::Method;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::GemCache;
use crate::endpoint::{Behavior, Endpoint, EndpointRoute};
use crate::error::CoreError;
use crate::source::{SourceKind, SourceRequest, SourceSelector};
use crate::upstream::Upstream;

/// Cache-Control sent with the root redirect (one year)
pub const ROOT_CACHE_CONTROL: &str = "public, max-age=31536000";

/// What a source answers for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Redirect to an upstream URL
    Redirect {
        location: String,
        cache_control: Option<&'static str>,
    },
    /// Mutating request refused by a read-only source
    Forbidden(&'static str),
    /// Gem content and its stored response headers
    Gem(StoredGem),
}

/// How a source serves gem downloads
#[async_trait]
pub trait GemFetchStrategy: Send + Sync {
    async fn serve_gem(
        &self,
        upstream: &Upstream,
        id: &str,
        query: Option<&str>,
    ) -> Result<Outcome, CoreError>;
}

/// Gem downloads are redirected like every other readable endpoint
pub struct RedirectGems;

#[async_trait]
impl GemFetchStrategy for RedirectGems {
    async fn serve_gem(
        &self,
        upstream: &Upstream,
        id: &str,
        query: Option<&str>,
    ) -> Result<Outcome, CoreError> {
        let path = Endpoint::GemFetch.path(Some(id));
        Ok(redirect(upstream, Endpoint::GemFetch, &path, query))
    }
}

fn redirect(upstream: &Upstream, endpoint: Endpoint, path: &str, query: Option<&str>) -> Outcome {
    let location = upstream.url(path, query);
    debug!("Redirecting {} to {}", endpoint.as_str(), location);
    metrics::counter!("gem_cache_redirects_total").increment(1);

    Outcome::Redirect {
        location,
        cache_control: (endpoint == Endpoint::Root).then_some(ROOT_CACHE_CONTROL),
    }
}

/// Gem service dispatching requests to their source
pub struct GemService {
    selector: SourceSelector,
    redirect: RedirectGems,
    cache: Arc<GemCache>,
}

impl GemService {
    /// Create a new gem service
    pub fn new(selector: SourceSelector, cache: Arc<GemCache>) -> Self {
        Self {
            selector,
            redirect: RedirectGems,
            cache,
        }
    }

    pub fn selector(&self) -> &SourceSelector {
        &self.selector
    }

    /// Answer a request: select its source, match the endpoint, serve it
    pub async fn handle(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<Outcome, CoreError> {
        let request = self.selector.select(path);
        let route = EndpointRoute::parse(method, &request.path)
            .ok_or_else(|| CoreError::NotFound(format!("{} {}", method, path)))?;

        self.serve(&request, &route, query).await
    }

    /// Gem fetch strategy of a source
    fn strategy(&self, kind: SourceKind) -> &dyn GemFetchStrategy {
        if kind.caches_gems() {
            return self.cache.as_ref();
        }
        &self.redirect
    }

    /// Serve a matched endpoint for a bound request
    pub async fn serve(
        &self,
        request: &SourceRequest,
        route: &EndpointRoute,
        query: Option<&str>,
    ) -> Result<Outcome, CoreError> {
        let endpoint = route.endpoint;

        match endpoint.behavior() {
            Behavior::Forbidden => {
                let message = endpoint.forbidden_message().unwrap_or("Forbidden");
                info!(
                    "Rejected {} against {} source",
                    endpoint.as_str(),
                    request.kind.as_str()
                );
                metrics::counter!("gem_cache_forbidden_total").increment(1);
                Ok(Outcome::Forbidden(message))
            }
            Behavior::CacheOrRedirect => {
                let id = route.id.as_deref().unwrap_or_default();
                self.strategy(request.kind)
                    .serve_gem(&request.upstream, id, query)
                    .await
            }
            Behavior::Redirect => Ok(redirect(
                &request.upstream,
                endpoint,
                &route.upstream_path(),
                query,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::{FakeUpstream, MemoryStorage};
    use bytes::Bytes;
    use gem_storage::{Properties, StorageBackend};
    use std::sync::atomic::Ordering;

    struct Harness {
        service: GemService,
        storage: Arc<MemoryStorage>,
        upstream: Arc<FakeUpstream>,
    }

    fn harness() -> Harness {
        let storage = Arc::new(MemoryStorage::default());
        let upstream = Arc::new(FakeUpstream::ok(b"gem bytes"));
        let cache = Arc::new(GemCache::new(storage.clone(), upstream.clone()));
        let selector = SourceSelector::new(Upstream::new("https://rubygems.org"));
        Harness {
            service: GemService::new(selector, cache),
            storage,
            upstream,
        }
    }

    /// Default, caching and redirect sources
    const SOURCES: [&str; 3] = [
        "",
        "/upstream/https%3A%2F%2Fexample.org",
        "/redirect/https%3A%2F%2Fexample.org",
    ];

    #[tokio::test]
    async fn test_mutating_endpoints_are_forbidden_everywhere() {
        let h = harness();

        for prefix in SOURCES {
            for endpoint in Endpoint::ALL.into_iter().filter(|e| e.is_mutating()) {
                let path = format!("{}{}", prefix, endpoint.template());
                let outcome = h
                    .service
                    .handle(&endpoint.method(), &path, Some("gem=foo"))
                    .await
                    .unwrap();
                assert_eq!(
                    outcome,
                    Outcome::Forbidden(endpoint.forbidden_message().unwrap())
                );
            }
        }

        assert_eq!(h.storage.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_yank_message() {
        let h = harness();
        let outcome = h
            .service
            .handle(
                &Method::DELETE,
                "/upstream/https%3A%2F%2Fexample.org/api/v1/gems/yank",
                Some("gem=foo"),
            )
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Forbidden("Cannot yank from an upstream server!"));
    }

    #[tokio::test]
    async fn test_readable_endpoints_redirect_with_query() {
        let h = harness();

        for prefix in SOURCES {
            for endpoint in Endpoint::ALL {
                if endpoint.behavior() != Behavior::Redirect {
                    continue;
                }
                let path = format!("{}{}", prefix, endpoint.path(Some("foo-1.0")));
                let outcome = h
                    .service
                    .handle(&Method::GET, &path, Some("a=1&b=%20c"))
                    .await
                    .unwrap();

                let base = if prefix.is_empty() {
                    "https://rubygems.org"
                } else {
                    "https://example.org"
                };
                let expected = format!("{}{}?a=1&b=%20c", base, endpoint.path(Some("foo-1.0")));
                match outcome {
                    Outcome::Redirect { location, .. } => assert_eq!(location, expected),
                    other => panic!("expected redirect for {:?}, got {:?}", endpoint, other),
                }
            }
        }

        assert_eq!(h.storage.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_root_redirect_is_cacheable() {
        let h = harness();
        let outcome = h
            .service
            .handle(&Method::GET, "/redirect/https%3A%2F%2Fexample.org/", None)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Redirect {
                location: "https://example.org/".to_string(),
                cache_control: Some(ROOT_CACHE_CONTROL),
            }
        );

        let outcome = h
            .service
            .handle(&Method::GET, "/redirect/https%3A%2F%2Fexample.org/names", None)
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Redirect { cache_control: None, .. }));
    }

    #[tokio::test]
    async fn test_redirect_source_redirects_gems() {
        let h = harness();
        let outcome = h
            .service
            .handle(
                &Method::GET,
                "/redirect/https%3A%2F%2Fexample.org/gems/foo-1.0.gem",
                Some("x=1"),
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Redirect {
                location: "https://example.org/gems/foo-1.0.gem?x=1".to_string(),
                cache_control: None,
            }
        );
        assert_eq!(h.storage.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_source_caches_gems() {
        let h = harness();
        let path = "/upstream/https%3A%2F%2Fexample.org/gems/foo-1.0.gem";

        let first = h.service.handle(&Method::GET, path, None).await.unwrap();
        let second = h.service.handle(&Method::GET, path, None).await.unwrap();

        assert_eq!(first, second);
        match first {
            Outcome::Gem(gem) => assert_eq!(gem.content, Bytes::from_static(b"gem bytes")),
            other => panic!("expected gem, got {:?}", other),
        }
        assert_eq!(
            *h.upstream.urls.lock().unwrap(),
            vec!["https://example.org/gems/foo-1.0.gem".to_string()]
        );
        assert!(h.storage.exists("foo-1.0.gem").await.unwrap());
    }

    #[tokio::test]
    async fn test_default_source_uses_configured_upstream() {
        let h = harness();
        h.service
            .handle(&Method::GET, "/gems/rack-3.0.0.gem", Some("ignored=1"))
            .await
            .unwrap();
        assert_eq!(
            *h.upstream.urls.lock().unwrap(),
            vec!["https://rubygems.org/gems/rack-3.0.0.gem".to_string()]
        );
    }

    #[tokio::test]
    async fn test_cached_gem_keeps_stored_properties() {
        let mut properties = Properties::new();
        properties.insert("content-type".to_string(), "application/x-tar".to_string());
        let stored = StoredGem {
            content: Bytes::from_static(b"stored"),
            properties,
        };
        let storage = Arc::new(MemoryStorage::with_gem("rack-3.0.0.gem", stored.clone()));
        let upstream = Arc::new(FakeUpstream::ok(b"fresh"));
        let cache = Arc::new(GemCache::new(storage, upstream.clone()));
        let service = GemService::new(
            SourceSelector::new(Upstream::new("https://rubygems.org")),
            cache,
        );

        let outcome = service
            .handle(&Method::GET, "/gems/rack-3.0.0.gem", None)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Gem(stored));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_endpoint_is_not_found() {
        let h = harness();
        let err = h
            .service
            .handle(&Method::GET, "/upstream/x/unknown", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
