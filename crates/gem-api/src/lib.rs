//! Gem Cache HTTP API
//!
//! This crate provides the Axum-based HTTP surface of Gem Cache: the gem
//! server endpoints (dispatched through the core), health checks and the
//! metrics endpoint.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
