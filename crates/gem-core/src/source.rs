//! Source selection
//!
//! Every request is answered by exactly one source:
//! - `/redirect/<upstream>/...` redirects everything to the named upstream
//! - `/upstream/<upstream>/...` caches gems from the named upstream
//! - anything else caches gems from the configured default upstream

use tracing::debug;

use crate::route::{REDIRECT_PREFIX, UPSTREAM_PREFIX, match_prefix};
use crate::upstream::Upstream;

/// The closed set of gem sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Path-named upstream, redirect only
    Redirect,
    /// Path-named upstream, gems cached locally
    Upstream,
    /// Configured upstream, gems cached locally
    Default,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Redirect => "redirect",
            SourceKind::Upstream => "upstream",
            SourceKind::Default => "default",
        }
    }

    /// Whether gem downloads are served from the local cache
    pub fn caches_gems(self) -> bool {
        !matches!(self, SourceKind::Redirect)
    }
}

/// A request bound to its source and upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    pub kind: SourceKind,
    pub upstream: Upstream,
    /// Request path left for the endpoint table
    pub path: String,
}

/// Picks the source for a request path
///
/// Built once at startup; the prefix table is fixed and checked in order
/// before falling back to the default upstream.
#[derive(Debug, Clone)]
pub struct SourceSelector {
    prefixes: [(SourceKind, &'static str); 2],
    default_upstream: Upstream,
}

impl SourceSelector {
    pub fn new(default_upstream: Upstream) -> Self {
        Self {
            prefixes: [
                (SourceKind::Redirect, REDIRECT_PREFIX),
                (SourceKind::Upstream, UPSTREAM_PREFIX),
            ],
            default_upstream,
        }
    }

    pub fn default_upstream(&self) -> &Upstream {
        &self.default_upstream
    }

    /// Bind a request path to a source
    pub fn select(&self, path: &str) -> SourceRequest {
        for (kind, prefix) in self.prefixes {
            if let Some(m) = match_prefix(path, prefix) {
                debug!(
                    "Selected {} source for {} (upstream: {})",
                    kind.as_str(),
                    path,
                    m.identifier
                );
                return SourceRequest {
                    kind,
                    upstream: Upstream::new(m.identifier),
                    path: m.remainder,
                };
            }
        }

        SourceRequest {
            kind: SourceKind::Default,
            upstream: self.default_upstream.clone(),
            path: path.to_string(),
        }
    }
}
