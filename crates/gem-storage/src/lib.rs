//! Gem Cache Storage Layer
//!
//! This crate provides the artifact store used by the caching proxy:
//! a small key/value abstraction (exists / load / save by identifier)
//! and a local disk implementation.

pub mod backend;
pub mod error;
pub mod local;

pub use backend::{Properties, StorageBackend, StoredGem};
pub use error::StorageError;
pub use local::LocalStorage;
