//! Gem Cache Upstream Proxy
//!
//! This crate provides the client for fetching artifacts from upstream
//! gem servers.

pub mod client;
pub mod error;

pub use client::{FetchedResponse, UpstreamClient, UpstreamClientConfig, UpstreamFetcher};
pub use error::ProxyError;
pub use reqwest::header::HeaderMap;
