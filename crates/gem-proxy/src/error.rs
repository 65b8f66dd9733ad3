//! Proxy error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned error: {status} for {url}")]
    UpstreamError { status: u16, url: String },

    #[error("Upstream timed out: {0}")]
    Timeout(String),
}

impl ProxyError {
    /// HTTP status to surface to the client for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::UpstreamError { status, .. } => *status,
            ProxyError::Timeout(_) => 504,
            ProxyError::Http(e) if e.is_timeout() => 504,
            ProxyError::Http(e) => e.status().map(|s| s.as_u16()).unwrap_or(502),
        }
    }
}
