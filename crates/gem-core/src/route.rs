//! Prefix matching for path-derived sources
//!
//! Requests such as `/upstream/https%3A%2F%2Fexample.org/gems/foo-1.0.gem`
//! name their upstream in the first segment after a fixed prefix. Matching
//! decodes that segment and strips it, leaving `/gems/foo-1.0.gem` for the
//! endpoint table.

use percent_encoding::percent_decode_str;

/// Prefix of sources that only redirect to the named upstream
pub const REDIRECT_PREFIX: &str = "/redirect";

/// Prefix of sources that cache gems from the named upstream
pub const UPSTREAM_PREFIX: &str = "/upstream";

/// Result of a successful prefix match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Percent-decoded segment following the prefix
    pub identifier: String,
    /// Path with `<prefix>/<segment>` removed, always starting with `/`
    pub remainder: String,
}

/// Match `path` against `<prefix>/<segment>`
///
/// Returns `None` when the path does not start with the prefix followed by a
/// non-empty segment, or when the segment does not decode to UTF-8.
pub fn match_prefix(path: &str, prefix: &str) -> Option<RouteMatch> {
    let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;

    let (segment, remainder) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    if segment.is_empty() {
        return None;
    }

    let identifier = percent_decode_str(segment).decode_utf8().ok()?.into_owned();
    let remainder = if remainder.is_empty() {
        "/".to_string()
    } else {
        remainder.to_string()
    };

    Some(RouteMatch {
        identifier,
        remainder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_prefix_is_decoded_and_stripped() {
        let m = match_prefix(
            "/upstream/https%3A%2F%2Fexample.org/gems/foo-1.0.gem",
            UPSTREAM_PREFIX,
        )
        .unwrap();
        assert_eq!(m.identifier, "https://example.org");
        assert_eq!(m.remainder, "/gems/foo-1.0.gem");
    }

    #[test]
    fn test_trailing_slash_leaves_root() {
        let m = match_prefix("/redirect/https%3A%2F%2Fexample.org/", REDIRECT_PREFIX).unwrap();
        assert_eq!(m.identifier, "https://example.org");
        assert_eq!(m.remainder, "/");
    }

    #[test]
    fn test_bare_segment_leaves_root() {
        let m = match_prefix("/redirect/https%3A%2F%2Fexample.org", REDIRECT_PREFIX).unwrap();
        assert_eq!(m.remainder, "/");
    }

    #[test]
    fn test_no_match() {
        assert!(match_prefix("/gems/foo-1.0.gem", UPSTREAM_PREFIX).is_none());
        assert!(match_prefix("/upstream", UPSTREAM_PREFIX).is_none());
        assert!(match_prefix("/upstream/", UPSTREAM_PREFIX).is_none());
        assert!(match_prefix("/upstream//gems/a.gem", UPSTREAM_PREFIX).is_none());
        assert!(match_prefix("/upstreams/x/gems/a.gem", UPSTREAM_PREFIX).is_none());
        assert!(match_prefix("/prefix/upstream/x", UPSTREAM_PREFIX).is_none());
        assert!(match_prefix("/redirect/x", UPSTREAM_PREFIX).is_none());
    }

    #[test]
    fn test_invalid_utf8_segment_does_not_match() {
        assert!(match_prefix("/upstream/%FF%FE/gems/a.gem", UPSTREAM_PREFIX).is_none());
    }

    #[test]
    fn test_remainder_keeps_its_encoding() {
        let m = match_prefix("/upstream/host/info/a%2Db", UPSTREAM_PREFIX).unwrap();
        assert_eq!(m.identifier, "host");
        assert_eq!(m.remainder, "/info/a%2Db");
    }
}
