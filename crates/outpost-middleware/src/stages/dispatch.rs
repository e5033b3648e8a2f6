//! Dispatch stage: resource matching, authorization and invocation.
//!
//! # Pipeline Position
//!
//! ```text
//! [Dispatch] → Render → host fallback
//! ```
//!
//! Services are walked in registration order, and each service's resources in
//! their own order. The first resource that both addresses the path and binds
//! the verb wins; a resource that matches but lacks the verb is skipped. With
//! no winner the request passes on untouched and the render stage hands it
//! to the host.
//!
//! On a winner the action is invoked exactly once. Its entity is stored as a
//! [`RenderableEntity`] for the render stage; a failure short-circuits to the
//! [`ErrorRenderer`].

use super::authorization::Authorizer;
use super::error::ErrorRenderer;
use crate::context::MiddlewareContext;
use crate::input;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use bytes::Bytes;
use http::header::ACCEPT;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use outpost_core::{
    Action, Entity, OutpostResult, RequestContext, RequestParams, Resource, Service,
};
use outpost_router::Params;
use outpost_telemetry::metrics::{self, RequestOutcome};
use std::sync::Arc;
use std::time::Instant;

/// Status returned when the host aborts a request mid-invocation.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// An invoked action's result, waiting to be rendered.
#[derive(Debug, Clone)]
pub struct RenderableEntity {
    /// The entity the action returned.
    pub entity: Entity,
    /// The status the action left on its context.
    pub status: StatusCode,
}

struct Matched {
    resource: Arc<dyn Resource>,
    action: Arc<dyn Action>,
    params: Params,
}

/// Dispatch middleware.
pub struct DispatchMiddleware {
    services: Vec<Arc<dyn Service>>,
    authorizer: Authorizer,
    errors: ErrorRenderer,
}

impl DispatchMiddleware {
    /// Creates the stage over an ordered list of services.
    #[must_use]
    pub fn new(services: Vec<Arc<dyn Service>>, authorizer: Authorizer, errors: ErrorRenderer) -> Self {
        Self {
            services,
            authorizer,
            errors,
        }
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    fn resolve(&self, method: &Method, path: &str) -> Option<Matched> {
        for service in &self.services {
            for resource in service.resources() {
                let Some(params) = resource.matches(path) else {
                    continue;
                };
                let action = resource.action(method).or_else(|| {
                    if *method == Method::HEAD {
                        resource.action(&Method::GET)
                    } else {
                        None
                    }
                });
                match action {
                    Some(action) => {
                        tracing::debug!(
                            service = service.name(),
                            resource = resource.name(),
                            "resource matched"
                        );
                        return Some(Matched {
                            resource: Arc::clone(resource),
                            action,
                            params,
                        });
                    }
                    None => tracing::debug!(
                        resource = resource.name(),
                        method = %method,
                        "resource matched without an action for the verb"
                    ),
                }
            }
        }
        None
    }

    async fn invoke(
        &self,
        ctx: &mut MiddlewareContext,
        matched: &Matched,
        request: &Request,
        body: &Bytes,
    ) -> OutpostResult<Option<RenderableEntity>> {
        let auth = self
            .authorizer
            .authorize(matched.action.auth(), request)
            .await?;

        let mut input_map = match request.uri().query() {
            Some(query) => input::parse_urlencoded(query)?,
            None => serde_json::Map::new(),
        };
        input::merge(&mut input_map, input::parse_body(request.headers(), body)?);

        ctx.set_auth(auth.clone());
        ctx.set_resource(matched.resource.name());

        let action_ctx = RequestContext::with_request_id(ctx.request_id())
            .with_auth(auth)
            .with_params(RequestParams::new(matched.params.clone(), input_map));

        let mut abort = ctx.abort_signal();
        if abort.is_aborted() {
            return Ok(None);
        }

        let started = Instant::now();
        let result = tokio::select! {
            result = matched.action.invoke(&action_ctx) => Some(result),
            () = abort.aborted() => None,
        };
        metrics::record_invoke_duration(matched.resource.name(), started.elapsed());

        match result {
            Some(entity) => Ok(Some(RenderableEntity {
                entity: entity?,
                status: action_ctx.status(),
            })),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for DispatchMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchMiddleware")
            .field(
                "services",
                &self.services.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("authorizer", &self.authorizer)
            .finish_non_exhaustive()
    }
}

impl Middleware for DispatchMiddleware {
    fn name(&self) -> &'static str {
        "dispatch"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            outpost_telemetry::log_request_start!(
                ctx.request_id(),
                request.method(),
                request.uri().path()
            );

            let Some(matched) = self.resolve(request.method(), request.uri().path()) else {
                return next.run(ctx, request).await;
            };

            let (parts, body) = request.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(never) => match never {},
            };
            let request = Request::from_parts(parts, Full::new(body.clone()));
            let accept = request
                .headers()
                .get(ACCEPT)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);

            match self.invoke(ctx, &matched, &request, &body).await {
                Ok(Some(renderable)) => {
                    ctx.set_extension(renderable);
                    next.run(ctx, request).await
                }
                Ok(None) => {
                    tracing::info!(
                        request_id = %ctx.request_id(),
                        resource = matched.resource.name(),
                        "request aborted before the action completed"
                    );
                    metrics::record_request(RequestOutcome::Aborted);
                    let status = StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                        .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
                    Response::empty(status)
                }
                Err(e) => self.errors.render(ctx, accept.as_deref(), &e),
            }
        })
    }
}
