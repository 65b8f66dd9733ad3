//! Gem Cache Core Business Logic
//!
//! This crate provides the request-dispatch and caching core of the gem
//! pull-through proxy: prefix routing, upstream URL resolution, the
//! endpoint table, and the caching behavior for gem downloads.

pub mod cache;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod route;
pub mod source;
pub mod upstream;

pub use cache::{GemCache, capture_properties};
pub use dispatch::{GemFetchStrategy, GemService, Outcome, ROOT_CACHE_CONTROL, RedirectGems};
pub use endpoint::{Behavior, Endpoint, EndpointRoute};
pub use error::CoreError;
pub use route::{REDIRECT_PREFIX, RouteMatch, UPSTREAM_PREFIX, match_prefix};
pub use source::{SourceKind, SourceRequest, SourceSelector};
pub use upstream::Upstream;
