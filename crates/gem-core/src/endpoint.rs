//! Endpoint table shared by every gem source
//!
//! Each endpoint is served at the same path a gem server uses, so one
//! template per endpoint drives both request matching and upstream URL
//! resolution.

use http::Method;

/// Placeholder for the trailing identifier in a template
const ID_PLACEHOLDER: &str = "{id}";

/// Logical operations a gem source answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Root,
    AddGem,
    Yank,
    Unyank,
    AddSpec,
    RemoveSpec,
    Dependencies,
    DependenciesJson,
    Names,
    Versions,
    Info,
    QuickMarshal,
    FetchActual,
    GemFetch,
    LatestSpecs,
    Specs,
    PrereleaseSpecs,
}

/// How a source answers an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Redirect to the resolved upstream URL
    Redirect,
    /// Serve through the source's gem fetch strategy
    CacheOrRedirect,
    /// Reject: upstream-backed sources are read-only
    Forbidden,
}

impl Endpoint {
    pub const ALL: [Endpoint; 17] = [
        Endpoint::Root,
        Endpoint::AddGem,
        Endpoint::Yank,
        Endpoint::Unyank,
        Endpoint::AddSpec,
        Endpoint::RemoveSpec,
        Endpoint::Dependencies,
        Endpoint::DependenciesJson,
        Endpoint::Names,
        Endpoint::Versions,
        Endpoint::Info,
        Endpoint::QuickMarshal,
        Endpoint::FetchActual,
        Endpoint::GemFetch,
        Endpoint::LatestSpecs,
        Endpoint::Specs,
        Endpoint::PrereleaseSpecs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Root => "root",
            Endpoint::AddGem => "add_gem",
            Endpoint::Yank => "yank",
            Endpoint::Unyank => "unyank",
            Endpoint::AddSpec => "add_spec",
            Endpoint::RemoveSpec => "remove_spec",
            Endpoint::Dependencies => "dependencies",
            Endpoint::DependenciesJson => "dependencies_json",
            Endpoint::Names => "names",
            Endpoint::Versions => "versions",
            Endpoint::Info => "info",
            Endpoint::QuickMarshal => "quick_marshal",
            Endpoint::FetchActual => "fetch_actual",
            Endpoint::GemFetch => "gem_fetch",
            Endpoint::LatestSpecs => "latest_specs",
            Endpoint::Specs => "specs",
            Endpoint::PrereleaseSpecs => "prerelease_specs",
        }
    }

    /// Path template, identical on this server and upstream
    pub fn template(self) -> &'static str {
        match self {
            Endpoint::Root => "/",
            Endpoint::AddGem => "/api/v1/gems",
            Endpoint::Yank => "/api/v1/gems/yank",
            Endpoint::Unyank => "/api/v1/gems/unyank",
            Endpoint::AddSpec => "/api/v1/add_spec.json",
            Endpoint::RemoveSpec => "/api/v1/remove_spec.json",
            Endpoint::Dependencies => "/api/v1/dependencies",
            Endpoint::DependenciesJson => "/api/v1/dependencies.json",
            Endpoint::Names => "/names",
            Endpoint::Versions => "/versions",
            Endpoint::Info => "/info/{id}",
            Endpoint::QuickMarshal => "/quick/Marshal.4.8/{id}",
            Endpoint::FetchActual => "/fetch/actual/gem/{id}",
            Endpoint::GemFetch => "/gems/{id}",
            Endpoint::LatestSpecs => "/latest_specs.4.8.gz",
            Endpoint::Specs => "/specs.4.8.gz",
            Endpoint::PrereleaseSpecs => "/prerelease_specs.4.8.gz",
        }
    }

    /// HTTP method the endpoint is served on (readable endpoints also accept HEAD)
    pub fn method(self) -> Method {
        match self {
            Endpoint::AddGem | Endpoint::AddSpec | Endpoint::RemoveSpec => Method::POST,
            Endpoint::Yank => Method::DELETE,
            Endpoint::Unyank => Method::PUT,
            _ => Method::GET,
        }
    }

    pub fn behavior(self) -> Behavior {
        match self {
            Endpoint::AddGem
            | Endpoint::Yank
            | Endpoint::Unyank
            | Endpoint::AddSpec
            | Endpoint::RemoveSpec => Behavior::Forbidden,
            Endpoint::GemFetch => Behavior::CacheOrRedirect,
            _ => Behavior::Redirect,
        }
    }

    pub fn is_mutating(self) -> bool {
        self.behavior() == Behavior::Forbidden
    }

    /// Fixed rejection message for mutating endpoints
    pub fn forbidden_message(self) -> Option<&'static str> {
        match self {
            Endpoint::AddGem => Some("Cannot add gem to an upstream server!"),
            Endpoint::Yank => Some("Cannot yank from an upstream server!"),
            Endpoint::Unyank => Some("Cannot unyank from an upstream server!"),
            Endpoint::AddSpec => Some("Cannot add spec to an upstream server!"),
            Endpoint::RemoveSpec => Some("Cannot remove spec from an upstream server!"),
            _ => None,
        }
    }

    /// Substitute an identifier into the template
    pub fn path(self, id: Option<&str>) -> String {
        let template = self.template();
        match template.strip_suffix(ID_PLACEHOLDER) {
            Some(prefix) => format!("{}{}", prefix, id.unwrap_or_default()),
            None => template.to_string(),
        }
    }

    fn accepts(self, method: &Method) -> bool {
        let expected = self.method();
        *method == expected || (expected == Method::GET && *method == Method::HEAD)
    }

    /// Match a path against the template, yielding the identifier if any
    fn match_path(self, path: &str) -> Option<Option<String>> {
        let template = self.template();
        match template.strip_suffix(ID_PLACEHOLDER) {
            Some(prefix) => {
                let id = path.strip_prefix(prefix)?;
                if id.is_empty() || id.contains('/') {
                    None
                } else {
                    Some(Some(id.to_string()))
                }
            }
            None => (path == template).then_some(None),
        }
    }
}

/// An endpoint selected for a request, with its identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRoute {
    pub endpoint: Endpoint,
    pub id: Option<String>,
}

impl EndpointRoute {
    /// Find the endpoint serving `method` on `path` (prefix already stripped)
    pub fn parse(method: &Method, path: &str) -> Option<Self> {
        Endpoint::ALL.iter().find_map(|&endpoint| {
            if !endpoint.accepts(method) {
                return None;
            }
            endpoint
                .match_path(path)
                .map(|id| EndpointRoute { endpoint, id })
        })
    }

    /// Path of this route on an upstream server
    pub fn upstream_path(&self) -> String {
        self.endpoint.path(self.id.as_deref())
    }
}
