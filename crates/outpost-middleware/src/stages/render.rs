//! Render stage: header projection and representation formatting.
//!
//! # Pipeline Position
//!
//! ```text
//! Dispatch → [Render] → host fallback
//! ```
//!
//! When dispatch left a [`RenderableEntity`], this stage projects its
//! metadata onto response headers, negotiates a formatter from `Accept`, and
//! formats the entity. HEAD requests stop after the headers. Without a
//! renderable entity the request was not handled and goes to the host.

use super::dispatch::RenderableEntity;
use super::error::ErrorRenderer;
use crate::base_uri::BaseUriResolver;
use crate::context::MiddlewareContext;
use crate::input;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt, VARY_ON};
use http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_LANGUAGE, ETAG, EXPIRES, LAST_MODIFIED,
    LINK, LOCATION, VARY,
};
use http::Method;
use outpost_core::{Entity, OutpostError};
use outpost_format::{link, FormatterRegistry, RenderOptions};
use outpost_telemetry::metrics::{self, RequestOutcome};
use std::sync::Arc;
use std::time::Instant;

/// Projects entity metadata onto response headers.
///
/// `Link` lists every link relation with its absolute href, whether or not
/// links are rendered in the body. `Vary` is always present. Values that are
/// not valid header values are skipped.
///
/// ```
/// use outpost_core::{Entity, Link, Meta};
/// use outpost_middleware::stages::render::project_headers;
///
/// let entity = Entity::typed("widget")
///     .with_meta(Meta::new().with_etag("\"v1\""))
///     .with_link("self", Link::new("/widgets/1"));
///
/// let headers = project_headers(&entity, "https://api.example.com");
/// assert_eq!(headers["etag"], "\"v1\"");
/// assert_eq!(headers["link"], "<https://api.example.com/widgets/1>; rel=\"self\"");
/// assert_eq!(headers["vary"], "Authorization, Accept");
/// ```
#[must_use]
pub fn project_headers(entity: &Entity, base_uri: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let meta = &entity.meta;

    insert(&mut headers, ETAG, entity.etag());
    insert(&mut headers, LOCATION, meta.location.as_deref());
    insert(&mut headers, LAST_MODIFIED, meta.last_modified.as_deref());
    insert(&mut headers, EXPIRES, meta.expires.as_deref());
    insert(&mut headers, CONTENT_LANGUAGE, meta.language.as_deref());

    let links: Vec<String> = entity
        .links
        .iter()
        .flat_map(|(rel, relation)| relation.iter().map(move |l| (rel, l)))
        .filter(|(_, l)| !l.href.is_empty())
        .map(|(rel, l)| format!("<{}>; rel=\"{rel}\"", link::resolve(base_uri, &l.href)))
        .collect();
    if !links.is_empty() {
        insert(&mut headers, LINK, Some(&links.join(", ")));
    }

    headers.insert(VARY, HeaderValue::from_static(VARY_ON));
    headers
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "skipping header with invalid value"),
    }
}

/// Render middleware.
#[derive(Debug, Clone)]
pub struct RenderMiddleware {
    registry: Arc<FormatterRegistry>,
    errors: ErrorRenderer,
    base_uri: BaseUriResolver,
    defaults: RenderOptions,
    token_param: String,
}

impl RenderMiddleware {
    /// Creates the stage with every section enabled and `access_token` as
    /// the propagated token parameter.
    #[must_use]
    pub fn new(registry: Arc<FormatterRegistry>, base_uri: BaseUriResolver) -> Self {
        Self {
            errors: ErrorRenderer::new(Arc::clone(&registry)),
            registry,
            base_uri,
            defaults: RenderOptions::new(String::new()),
            token_param: "access_token".to_string(),
        }
    }

    /// Sets the section defaults that query overrides start from. The base
    /// URI of `defaults` is ignored.
    #[must_use]
    pub fn with_defaults(mut self, defaults: RenderOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sets the query parameter forwarded onto generated links.
    #[must_use]
    pub fn with_token_param(mut self, token_param: impl Into<String>) -> Self {
        self.token_param = token_param.into();
        self
    }

    fn options(&self, base_uri: String, request: &Request) -> RenderOptions {
        let pairs = input::query_pairs(request.uri().query());
        RenderOptions {
            base_uri,
            query_string: None,
            ..self.defaults.clone()
        }
        .with_query_overrides(&pairs, &self.token_param)
    }
}

impl Middleware for RenderMiddleware {
    fn name(&self) -> &'static str {
        "render"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let Some(RenderableEntity { entity, status }) =
                ctx.remove_extension::<RenderableEntity>()
            else {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.path = %request.uri().path(),
                    "request not handled"
                );
                metrics::record_request(RequestOutcome::NotHandled);
                return next.run(ctx, request).await;
            };

            let base_uri = self.base_uri.resolve(request.headers(), request.uri());
            let headers = project_headers(&entity, &base_uri);

            if request.method() == Method::HEAD {
                let mut response = Response::empty(status);
                response.headers_mut().extend(headers);
                metrics::record_request(RequestOutcome::Handled);
                outpost_telemetry::log_request_complete!(
                    ctx.request_id(),
                    status.as_u16(),
                    "none",
                    elapsed_ms(ctx)
                );
                return response;
            }

            let options = self.options(base_uri, &request);
            let accept = request.headers().get(ACCEPT).and_then(|v| v.to_str().ok());
            let negotiated = self.registry.negotiate(accept);

            let started = Instant::now();
            let body = match negotiated.formatter.format_entity(&entity, &options) {
                Ok(body) => body,
                Err(e) => {
                    let error = OutpostError::internal_with_source("failed to render entity", e);
                    return self.errors.render(ctx, accept, &error);
                }
            };
            metrics::record_render_duration(negotiated.name, started.elapsed());

            let mut response =
                Response::with_body(status, negotiated.formatter.content_type(), body);
            response.headers_mut().extend(headers);

            metrics::record_request(RequestOutcome::Handled);
            outpost_telemetry::log_request_complete!(
                ctx.request_id(),
                status.as_u16(),
                negotiated.name,
                elapsed_ms(ctx)
            );
            response
        })
    }
}

fn elapsed_ms(ctx: &MiddlewareContext) -> u64 {
    u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX)
}
