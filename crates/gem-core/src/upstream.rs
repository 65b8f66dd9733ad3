//! Upstream gem servers and URL resolution

use std::fmt;

/// A remote gem server, identified by its base URL
///
/// The URL is not validated here; a malformed one surfaces as an upstream
/// failure when fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an endpoint path against this upstream
    ///
    /// The raw query string is appended verbatim; an empty one adds nothing.
    pub fn url(&self, path: &str, query: Option<&str>) -> String {
        let base = self.base_url.trim_end_matches('/');
        let mut url = String::with_capacity(base.len() + path.len() + 1);
        url.push_str(base);
        url.push_str(path);

        if let Some(query) = query
            && !query.is_empty()
        {
            url.push('?');
            url.push_str(query);
        }

        url
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_path() {
        let upstream = Upstream::new("https://rubygems.org");
        assert_eq!(
            upstream.url("/gems/rack-3.0.0.gem", None),
            "https://rubygems.org/gems/rack-3.0.0.gem"
        );
        assert_eq!(upstream.url("/", None), "https://rubygems.org/");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let upstream = Upstream::new("https://example.org/mirror/");
        assert_eq!(upstream.url("/names", None), "https://example.org/mirror/names");
    }

    #[test]
    fn test_query_forwarded_verbatim() {
        let upstream = Upstream::new("https://rubygems.org");
        assert_eq!(
            upstream.url("/api/v1/dependencies", Some("gems=rack,rails%2Ca&x=+y")),
            "https://rubygems.org/api/v1/dependencies?gems=rack,rails%2Ca&x=+y"
        );
        assert_eq!(upstream.url("/names", Some("")), "https://rubygems.org/names");
    }
}
