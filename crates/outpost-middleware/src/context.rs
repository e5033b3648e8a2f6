//! Per-request pipeline state.

use crate::abort::AbortSignal;
use outpost_core::{AuthContext, RequestId};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// State that flows through the pipeline stages for one request.
///
/// The action itself never sees this; it receives an
/// [`outpost_core::RequestContext`] built by the dispatch stage.
///
/// # Example
///
/// ```
/// use outpost_middleware::MiddlewareContext;
///
/// #[derive(Debug, PartialEq)]
/// struct Matched(&'static str);
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.set_extension(Matched("widget"));
/// assert_eq!(ctx.get_extension::<Matched>(), Some(&Matched("widget")));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    auth: AuthContext,
    resource: Option<String>,
    started_at: Instant,
    abort: AbortSignal,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            auth: AuthContext::Anonymous,
            resource: None,
            started_at: Instant::now(),
            abort: AbortSignal::never(),
            extensions: HashMap::new(),
        }
    }

    /// Attaches the signal that aborts this request.
    #[must_use]
    pub fn with_abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort = signal;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the authorization context derived for the matched action.
    #[must_use]
    pub const fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Records the derived authorization context.
    pub fn set_auth(&mut self, auth: AuthContext) {
        self.auth = auth;
    }

    /// Returns the name of the matched resource, if any.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Records the matched resource.
    pub fn set_resource(&mut self, name: impl Into<String>) {
        self.resource = Some(name.into());
    }

    /// Returns a clone of the abort signal.
    #[must_use]
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Returns when the request entered the pipeline.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the time since the request entered the pipeline.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous one.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::AbortHandle;
    use outpost_core::Scope;

    #[test]
    fn test_new_context_is_anonymous() {
        let ctx = MiddlewareContext::new();
        assert!(ctx.auth().is_anonymous());
        assert!(ctx.resource().is_none());
        assert!(!ctx.abort_signal().is_aborted());
    }

    #[test]
    fn test_set_auth_and_resource() {
        let mut ctx = MiddlewareContext::new();
        ctx.set_auth(AuthContext::Client {
            client: "billing".to_string(),
            scope: Scope::parse("invoices"),
        });
        ctx.set_resource("invoice");

        assert_eq!(ctx.auth().client(), Some("billing"));
        assert_eq!(ctx.resource(), Some("invoice"));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct Marker(u8);

        let mut ctx = MiddlewareContext::new();
        assert!(!ctx.has_extension::<Marker>());

        ctx.set_extension(Marker(1));
        ctx.set_extension(Marker(2));
        assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker(2)));

        assert_eq!(ctx.remove_extension::<Marker>(), Some(Marker(2)));
        assert!(ctx.remove_extension::<Marker>().is_none());
    }

    #[test]
    fn test_abort_signal_is_shared() {
        let handle = AbortHandle::new();
        let ctx = MiddlewareContext::new().with_abort_signal(handle.signal());

        handle.abort();
        assert!(ctx.abort_signal().is_aborted());
    }

    #[test]
    fn test_request_id_is_kept() {
        let id = RequestId::new();
        let ctx = MiddlewareContext::with_request_id(id);
        assert_eq!(ctx.request_id(), id);
    }
}
