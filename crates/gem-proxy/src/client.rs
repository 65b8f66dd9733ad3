//! Upstream gem server client

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ProxyError;

/// Upstream client configuration
#[derive(Clone, Debug)]
pub struct UpstreamClientConfig {
    /// Total time allowed for one upstream request
    pub timeout: Duration,
    /// Time allowed to establish the connection
    pub connect_timeout: Duration,
    /// User-Agent sent to upstream servers
    pub user_agent: String,
    /// Skip TLS certificate verification
    pub skip_tls_verify: bool,
}

impl Default for UpstreamClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("gem-cache/{}", env!("CARGO_PKG_VERSION")),
            skip_tls_verify: false,
        }
    }
}

/// A successful upstream response
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub body: Bytes,
    pub headers: HeaderMap,
}

/// Fetches resources from upstream servers
///
/// Any non-2xx answer or transport failure is reported as a [`ProxyError`]
/// that carries the HTTP status to surface.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// GET a fully resolved upstream URL
    async fn get(&self, url: &str) -> Result<FetchedResponse, ProxyError>;
}

/// reqwest-backed upstream client, shared by all requests
///
/// Holds no per-upstream state: each request resolves its own URL, so one
/// client serves the configured default upstream and any path-named one.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(config: UpstreamClientConfig) -> Result<Self, ProxyError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone());

        if config.skip_tls_verify {
            warn!("TLS certificate verification disabled for upstream requests");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build()?;

        info!(
            "Created upstream client (timeout: {:?}, user agent: {})",
            config.timeout, config.user_agent
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamFetcher for UpstreamClient {
    async fn get(&self, url: &str) -> Result<FetchedResponse, ProxyError> {
        debug!("Fetching from upstream: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProxyError::Timeout(url.to_string())
            } else {
                ProxyError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream returned {} for {}", status, url);
            return Err(ProxyError::UpstreamError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(FetchedResponse { body, headers })
    }
}
