//! Prometheus metrics endpoint
//!
//! Exposes the `gem_cache_*` counters recorded by the core (cache hits and
//! misses, redirects, forbidden writes, upstream errors) and the health checks.

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::state::MetricsHandle;

/// Metrics routes, mounted only when the recorder is installed
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(handle)
}

/// GET /metrics
async fn render_metrics(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    handle.render()
}
