//! Verb tables.
//!
//! [`MethodRouter`] binds HTTP methods to a value for a single resource. In
//! Outpost that value is usually an `Arc<dyn Action>`, but the table is
//! generic so that it can be tested and reused with plain identifiers.

use http::Method;

/// Maps HTTP methods to bound values for a single resource.
///
/// `HEAD` resolves to the explicit `HEAD` binding when present and otherwise
/// to the `GET` binding, so a resource that can be read can also be probed.
///
/// # Example
///
/// ```rust
/// use outpost_router::MethodRouter;
/// use http::Method;
///
/// let verbs = MethodRouter::new()
///     .get("listWidgets")
///     .post("createWidget");
///
/// assert_eq!(verbs.route(&Method::GET), Some(&"listWidgets"));
/// assert_eq!(verbs.route(&Method::HEAD), Some(&"listWidgets"));
/// assert_eq!(verbs.route(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    get: Option<T>,
    post: Option<T>,
    put: Option<T>,
    delete: Option<T>,
    patch: Option<T>,
    head: Option<T>,
    options: Option<T>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            get: None,
            post: None,
            put: None,
            delete: None,
            patch: None,
            head: None,
            options: None,
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty verb table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds GET.
    #[must_use]
    pub fn get(mut self, value: T) -> Self {
        self.get = Some(value);
        self
    }

    /// Binds POST.
    #[must_use]
    pub fn post(mut self, value: T) -> Self {
        self.post = Some(value);
        self
    }

    /// Binds PUT.
    #[must_use]
    pub fn put(mut self, value: T) -> Self {
        self.put = Some(value);
        self
    }

    /// Binds DELETE.
    #[must_use]
    pub fn delete(mut self, value: T) -> Self {
        self.delete = Some(value);
        self
    }

    /// Binds PATCH.
    #[must_use]
    pub fn patch(mut self, value: T) -> Self {
        self.patch = Some(value);
        self
    }

    /// Binds HEAD explicitly, overriding the GET fallback.
    #[must_use]
    pub fn head(mut self, value: T) -> Self {
        self.head = Some(value);
        self
    }

    /// Binds OPTIONS.
    #[must_use]
    pub fn options(mut self, value: T) -> Self {
        self.options = Some(value);
        self
    }

    /// Binds an arbitrary method. Methods outside the supported set are ignored.
    #[must_use]
    pub fn method(mut self, method: &Method, value: T) -> Self {
        if let Some(slot) = self.slot_mut(method) {
            *slot = Some(value);
        }
        self
    }

    /// Returns the value bound to `method`, if any.
    #[must_use]
    pub fn route(&self, method: &Method) -> Option<&T> {
        match *method {
            Method::GET => self.get.as_ref(),
            Method::POST => self.post.as_ref(),
            Method::PUT => self.put.as_ref(),
            Method::DELETE => self.delete.as_ref(),
            Method::PATCH => self.patch.as_ref(),
            Method::HEAD => self.head.as_ref().or(self.get.as_ref()),
            Method::OPTIONS => self.options.as_ref(),
            _ => None,
        }
    }

    /// Merges another verb table into this one without overwriting existing bindings.
    ///
    /// ```rust
    /// use outpost_router::MethodRouter;
    /// use http::Method;
    ///
    /// let mut verbs = MethodRouter::new().get("a");
    /// verbs.merge(MethodRouter::new().get("b").post("c"));
    ///
    /// assert_eq!(verbs.route(&Method::GET), Some(&"a"));
    /// assert_eq!(verbs.route(&Method::POST), Some(&"c"));
    /// ```
    pub fn merge(&mut self, other: Self) {
        fn fill<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if slot.is_none() {
                *slot = incoming;
            }
        }

        fill(&mut self.get, other.get);
        fill(&mut self.post, other.post);
        fill(&mut self.put, other.put);
        fill(&mut self.delete, other.delete);
        fill(&mut self.patch, other.patch);
        fill(&mut self.head, other.head);
        fill(&mut self.options, other.options);
    }

    /// Returns true if at least one method is bound.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.allowed_methods().is_empty()
    }

    /// Returns the methods that resolve to a value, including HEAD via GET.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
        ]
        .into_iter()
        .filter(|m| self.route(m).is_some())
        .collect()
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<T>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            Method::HEAD => Some(&mut self.head),
            Method::OPTIONS => Some(&mut self.options),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_router() {
        let verbs: MethodRouter<&str> = MethodRouter::new();
        assert!(!verbs.has_any_method());
        assert!(verbs.allowed_methods().is_empty());
    }

    #[test]
    fn test_each_builder_binds_its_method() {
        let verbs = MethodRouter::new()
            .get("get")
            .post("post")
            .put("put")
            .delete("delete")
            .patch("patch")
            .options("options");

        assert_eq!(verbs.route(&Method::GET), Some(&"get"));
        assert_eq!(verbs.route(&Method::POST), Some(&"post"));
        assert_eq!(verbs.route(&Method::PUT), Some(&"put"));
        assert_eq!(verbs.route(&Method::DELETE), Some(&"delete"));
        assert_eq!(verbs.route(&Method::PATCH), Some(&"patch"));
        assert_eq!(verbs.route(&Method::OPTIONS), Some(&"options"));
        assert_eq!(verbs.route(&Method::TRACE), None);
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let verbs = MethodRouter::new().get("read");
        assert_eq!(verbs.route(&Method::HEAD), Some(&"read"));

        let explicit = MethodRouter::new().get("read").head("probe");
        assert_eq!(explicit.route(&Method::HEAD), Some(&"probe"));
    }

    #[test]
    fn test_head_without_get_is_unbound() {
        let verbs = MethodRouter::new().post("create");
        assert_eq!(verbs.route(&Method::HEAD), None);
    }

    #[test]
    fn test_generic_method_binding() {
        let verbs = MethodRouter::new()
            .method(&Method::PUT, 1)
            .method(&Method::TRACE, 2);

        assert_eq!(verbs.route(&Method::PUT), Some(&1));
        assert_eq!(verbs.route(&Method::TRACE), None);
    }

    #[test]
    fn test_allowed_methods_include_implicit_head() {
        let verbs = MethodRouter::new().get("a").delete("b");
        let allowed = verbs.allowed_methods();

        assert_eq!(allowed, vec![Method::GET, Method::DELETE, Method::HEAD]);
    }

    #[test]
    fn test_merge_does_not_overwrite() {
        let mut verbs = MethodRouter::new().get("original");
        verbs.merge(MethodRouter::new().get("replacement").patch("patch"));

        assert_eq!(verbs.route(&Method::GET), Some(&"original"));
        assert_eq!(verbs.route(&Method::PATCH), Some(&"patch"));
    }
}
