//! Per-request base URI resolution.
//!
//! The base is `scheme://host[root]`, where:
//!
//! - `scheme` comes from `x-forwarded-proto` when trusted, else the URI's own
//!   scheme, else the configured default
//! - `host` comes from the `host` header, else the URI authority
//! - `root` comes from `x-api-root-path`, else the configured root path

use http::header::HOST;
use http::{HeaderMap, Uri};

/// Header naming the protocol the client used to reach a proxy.
pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Header naming the path prefix the API is mounted under.
pub const API_ROOT_PATH: &str = "x-api-root-path";

const FALLBACK_HOST: &str = "localhost";

/// Resolves the base URI that relative links are prefixed with.
///
/// # Example
///
/// ```
/// use http::{HeaderMap, HeaderValue, Uri};
/// use outpost_middleware::BaseUriResolver;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("host", HeaderValue::from_static("api.example.com"));
/// headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
/// headers.insert("x-api-root-path", HeaderValue::from_static("/v2"));
///
/// let uri: Uri = "/widgets/1".parse().unwrap();
/// let base = BaseUriResolver::default().resolve(&headers, &uri);
/// assert_eq!(base, "https://api.example.com/v2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUriResolver {
    default_scheme: String,
    trust_forwarded_proto: bool,
    root_path: Option<String>,
}

impl BaseUriResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(default_scheme: impl Into<String>) -> Self {
        Self {
            default_scheme: default_scheme.into(),
            trust_forwarded_proto: true,
            root_path: None,
        }
    }

    /// Sets whether `x-forwarded-proto` is honoured.
    #[must_use]
    pub fn trust_forwarded_proto(mut self, trust: bool) -> Self {
        self.trust_forwarded_proto = trust;
        self
    }

    /// Sets the root path used when the request carries no `x-api-root-path`.
    #[must_use]
    pub fn with_root_path(mut self, root_path: Option<String>) -> Self {
        self.root_path = root_path;
        self
    }

    /// Resolves the base URI for one request.
    #[must_use]
    pub fn resolve(&self, headers: &HeaderMap, uri: &Uri) -> String {
        let scheme = self
            .forwarded_proto(headers)
            .or_else(|| uri.scheme_str())
            .unwrap_or(self.default_scheme.as_str());

        let host = header_str(headers, HOST.as_str())
            .or_else(|| uri.authority().map(http::uri::Authority::as_str))
            .unwrap_or(FALLBACK_HOST);

        let root = header_str(headers, API_ROOT_PATH).or(self.root_path.as_deref());

        let mut base = format!("{scheme}://{host}");
        if let Some(root) = root {
            base.push_str(root);
        }
        base
    }

    fn forwarded_proto<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        if !self.trust_forwarded_proto {
            return None;
        }
        // Proxies chain values as "https, http"; the first is the client's.
        header_str(headers, FORWARDED_PROTO)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

impl Default for BaseUriResolver {
    fn default() -> Self {
        Self::new("http")
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
