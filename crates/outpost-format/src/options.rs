//! Render options and their per-request query overrides.

/// Query parameter that toggles `_actions`.
pub const ACTIONS_PARAM: &str = "_actions";
/// Query parameter that toggles `_links`.
pub const LINKS_PARAM: &str = "_links";
/// Query parameter that toggles `_embedded`.
pub const EMBEDDED_PARAM: &str = "_embedded";
/// Query parameter that toggles `_meta`.
pub const META_PARAM: &str = "_meta";

/// Options controlling how an entity graph is rendered.
///
/// # Example
///
/// ```
/// use outpost_format::RenderOptions;
///
/// let pairs = vec![
///     ("_links".to_string(), "no".to_string()),
///     ("access_token".to_string(), "abc".to_string()),
/// ];
///
/// let options = RenderOptions::new("https://api.example.com")
///     .with_query_overrides(&pairs, "access_token");
///
/// assert!(!options.include_links);
/// assert!(options.include_meta);
/// assert_eq!(
///     options.query_string,
///     Some(vec![("access_token".to_string(), "abc".to_string())])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Scheme, host and root path that relative hrefs are resolved against.
    pub base_uri: String,
    /// Emit `_actions`.
    pub include_actions: bool,
    /// Emit `_links`.
    pub include_links: bool,
    /// Emit `_embedded`.
    pub include_embedded: bool,
    /// Emit `_meta`.
    pub include_meta: bool,
    /// Query pairs formats may propagate onto generated links.
    pub query_string: Option<Vec<(String, String)>>,
}

impl RenderOptions {
    /// Creates options with every section enabled.
    #[must_use]
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            include_actions: true,
            include_links: true,
            include_embedded: true,
            include_meta: true,
            query_string: None,
        }
    }

    /// Sets `include_actions`.
    #[must_use]
    pub fn include_actions(mut self, enabled: bool) -> Self {
        self.include_actions = enabled;
        self
    }

    /// Sets `include_links`.
    #[must_use]
    pub fn include_links(mut self, enabled: bool) -> Self {
        self.include_links = enabled;
        self
    }

    /// Sets `include_embedded`.
    #[must_use]
    pub fn include_embedded(mut self, enabled: bool) -> Self {
        self.include_embedded = enabled;
        self
    }

    /// Sets `include_meta`.
    #[must_use]
    pub fn include_meta(mut self, enabled: bool) -> Self {
        self.include_meta = enabled;
        self
    }

    /// Sets the propagated query pairs.
    #[must_use]
    pub fn with_query_string(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query_string = Some(pairs);
        self
    }

    /// Applies `_actions`, `_links`, `_embedded` and `_meta` overrides and
    /// captures the token parameter from decoded query pairs.
    ///
    /// A toggle with an empty value leaves the current setting alone. The
    /// first non-empty token value wins.
    #[must_use]
    pub fn with_query_overrides(mut self, pairs: &[(String, String)], token_param: &str) -> Self {
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                ACTIONS_PARAM => self.include_actions = flag_enabled(value),
                LINKS_PARAM => self.include_links = flag_enabled(value),
                EMBEDDED_PARAM => self.include_embedded = flag_enabled(value),
                META_PARAM => self.include_meta = flag_enabled(value),
                k if k == token_param && self.query_string.is_none() => {
                    self.query_string = Some(vec![(key.clone(), value.clone())]);
                }
                _ => {}
            }
        }
        self
    }

    /// Returns the propagated query pairs encoded as `k=v&k2=v2`.
    #[must_use]
    pub fn encoded_query(&self) -> Option<String> {
        self.query_string
            .as_ref()
            .filter(|pairs| !pairs.is_empty())
            .and_then(|pairs| serde_urlencoded::to_string(pairs).ok())
    }
}

/// Interprets an override value: `0`, `false` and `no` (any case) disable,
/// anything else enables.
#[must_use]
pub fn flag_enabled(value: &str) -> bool {
    let value = value.trim();
    !(value == "0" || value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no"))
}
