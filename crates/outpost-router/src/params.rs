//! Values bound by a URI pattern match.

use smallvec::SmallVec;

/// Resource patterns rarely bind more than a handful of segments.
type Bindings = SmallVec<[(String, String); 4]>;

/// Parameters bound by a [`UriPattern`](crate::UriPattern) match, in
/// template order.
///
/// Values are stored percent-decoded. A name keeps the first value bound to
/// it; later bindings of the same name are ignored.
///
/// ```rust
/// use outpost_router::Params;
///
/// let mut params = Params::new();
/// params.bind_encoded("widgetId", "blue%20one");
/// params.bind("view", "full");
///
/// assert_eq!(params.get("widgetId"), Some("blue one"));
/// assert_eq!(params.names().collect::<Vec<_>>(), ["widgetId", "view"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    bindings: Bindings,
}

impl Params {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to an already decoded value.
    ///
    /// Returns `false` if `name` was already bound.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.bindings.push((name, value.into()));
        true
    }

    /// Binds `name` to a raw path segment, percent-decoding it first.
    ///
    /// A segment that does not decode to UTF-8 is bound as-is.
    pub fn bind_encoded(&mut self, name: impl Into<String>, raw: &str) -> bool {
        let value = urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        self.bind(name, value)
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v.as_str()))
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|(n, _)| n == name)
    }

    /// Bound names in template order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}
