//! Resource, action and service contracts.
//!
//! Services group resources; resources decide whether they address a path
//! and which action handles a verb; actions do the work. Dispatch walks
//! services and resources in registration order and invokes the first action
//! it finds.
//!
//! The contracts are traits so that hosts can plug in their own resource
//! implementations. [`RouteResource`] and [`ServiceDef`] cover the common
//! case of a URI template with a verb table.

use crate::auth::AuthRequirement;
use crate::context::RequestContext;
use crate::entity::Entity;
use crate::error::OutpostResult;
use async_trait::async_trait;
use http::Method;
use outpost_router::{MethodRouter, Params, PatternError, UriPattern};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future, used by closure-based actions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A unit of work bound to a resource and verb.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use outpost_core::{Action, Entity, OutpostResult, RequestContext};
///
/// struct ShowWidget;
///
/// #[async_trait]
/// impl Action for ShowWidget {
///     async fn invoke(&self, ctx: &RequestContext) -> OutpostResult<Entity> {
///         let id = ctx.params().get("id").unwrap_or_default();
///         Ok(Entity::typed("widget").with_property("id", id))
///     }
/// }
/// ```
#[async_trait]
pub trait Action: Send + Sync {
    /// The authorization this action demands, if any.
    fn auth(&self) -> Option<&AuthRequirement> {
        None
    }

    /// Runs the action. Called exactly once per dispatched request.
    async fn invoke(&self, ctx: &RequestContext) -> OutpostResult<Entity>;
}

/// An addressable resource.
pub trait Resource: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &str;

    /// Returns the extracted URI parameters if this resource addresses `path`.
    fn matches(&self, path: &str) -> Option<Params>;

    /// Returns the action bound to `method`.
    fn action(&self, method: &Method) -> Option<Arc<dyn Action>>;
}

/// An ordered group of resources.
pub trait Service: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// The resources, in matching order.
    fn resources(&self) -> &[Arc<dyn Resource>];
}

/// An action backed by a closure.
///
/// ```
/// use outpost_core::{Entity, FnAction, RequestContext};
///
/// let action = FnAction::new(|ctx: &RequestContext| {
///     let name = ctx.params().get("name").unwrap_or("world").to_string();
///     Box::pin(async move { Ok(Entity::typed("greeting").with_property("to", name)) })
/// });
/// # let _ = action;
/// ```
pub struct FnAction<F> {
    func: F,
    auth: Option<AuthRequirement>,
}

impl<F> FnAction<F>
where
    F: for<'a> Fn(&'a RequestContext) -> BoxFuture<'a, OutpostResult<Entity>> + Send + Sync,
{
    /// Wraps a closure.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self { func, auth: None }
    }

    /// Attaches an authorization requirement.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: for<'a> Fn(&'a RequestContext) -> BoxFuture<'a, OutpostResult<Entity>> + Send + Sync,
{
    fn auth(&self) -> Option<&AuthRequirement> {
        self.auth.as_ref()
    }

    async fn invoke(&self, ctx: &RequestContext) -> OutpostResult<Entity> {
        (self.func)(ctx).await
    }
}

/// A resource addressed by a URI template with a verb table.
///
/// ```
/// use outpost_core::{Entity, FnAction, Resource, RouteResource};
/// use http::Method;
///
/// let resource = RouteResource::new("widget", "/widgets/{id}")
///     .unwrap()
///     .get(FnAction::new(|_ctx| Box::pin(async { Ok(Entity::typed("widget")) })));
///
/// assert!(resource.matches("/widgets/3").is_some());
/// assert!(resource.action(&Method::GET).is_some());
/// assert!(resource.action(&Method::DELETE).is_none());
/// ```
pub struct RouteResource {
    name: String,
    pattern: UriPattern,
    verbs: MethodRouter<Arc<dyn Action>>,
}

impl RouteResource {
    /// Creates a resource with no bound verbs.
    pub fn new(name: impl Into<String>, template: &str) -> Result<Self, PatternError> {
        Ok(Self {
            name: name.into(),
            pattern: UriPattern::parse(template)?,
            verbs: MethodRouter::new(),
        })
    }

    /// Binds an action to an arbitrary method.
    #[must_use]
    pub fn on(mut self, method: &Method, action: impl Action + 'static) -> Self {
        self.verbs = self.verbs.method(method, Arc::new(action));
        self
    }

    /// Binds GET (and implicitly HEAD).
    #[must_use]
    pub fn get(self, action: impl Action + 'static) -> Self {
        self.on(&Method::GET, action)
    }

    /// Binds POST.
    #[must_use]
    pub fn post(self, action: impl Action + 'static) -> Self {
        self.on(&Method::POST, action)
    }

    /// Binds PUT.
    #[must_use]
    pub fn put(self, action: impl Action + 'static) -> Self {
        self.on(&Method::PUT, action)
    }

    /// Binds PATCH.
    #[must_use]
    pub fn patch(self, action: impl Action + 'static) -> Self {
        self.on(&Method::PATCH, action)
    }

    /// Binds DELETE.
    #[must_use]
    pub fn delete(self, action: impl Action + 'static) -> Self {
        self.on(&Method::DELETE, action)
    }

    /// Returns the URI template.
    #[must_use]
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// Returns the methods with a bound action.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.verbs.allowed_methods()
    }
}

impl Resource for RouteResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, path: &str) -> Option<Params> {
        self.pattern.matches(path)
    }

    fn action(&self, method: &Method) -> Option<Arc<dyn Action>> {
        self.verbs.route(method).cloned()
    }
}

impl std::fmt::Debug for RouteResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteResource")
            .field("name", &self.name)
            .field("template", &self.pattern.template())
            .field("methods", &self.verbs.allowed_methods())
            .finish()
    }
}

/// A named, ordered list of resources.
#[derive(Clone)]
pub struct ServiceDef {
    name: String,
    resources: Vec<Arc<dyn Resource>>,
}

impl ServiceDef {
    /// Creates an empty service.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    /// Appends a resource; earlier resources are matched first.
    #[must_use]
    pub fn resource(mut self, resource: impl Resource + 'static) -> Self {
        self.resources.push(Arc::new(resource));
        self
    }

    /// Appends an already shared resource.
    #[must_use]
    pub fn shared_resource(mut self, resource: Arc<dyn Resource>) -> Self {
        self.resources.push(resource);
        self
    }
}

impl Service for ServiceDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn resources(&self) -> &[Arc<dyn Resource>] {
        &self.resources
    }
}
