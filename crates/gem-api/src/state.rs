//! Application state

use gem_core::GemService;
use std::sync::Arc;

/// Prometheus handle rendered by `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gems: Arc<GemService>,
}

impl AppState {
    pub fn new(gems: Arc<GemService>) -> Self {
        Self { gems }
    }
}
