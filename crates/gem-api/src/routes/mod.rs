//! API routes

mod gems;
mod health;
pub mod metrics;

use axum::Router;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
///
/// Gem server paths are not registered individually: every request that is
/// not a health or metrics check falls through to the gem dispatcher, which
/// selects the source from the path prefix.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .fallback(gems::serve)
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
