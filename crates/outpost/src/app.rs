//! Application assembly: [`Outpost`] and its builder.

use http::header::HeaderValue;
use outpost_config::{ConfigError, OutpostConfig};
use outpost_core::{RequestId, Service};
use outpost_format::{FormatError, Formatter, FormatterRegistry, RenderOptions};
use outpost_middleware::{
    AbortSignal, Authorizer, BaseUriResolver, CredentialVerifier, DispatchMiddleware,
    ErrorRenderer, ExtensionVerifier, MiddlewareContext, Pipeline, RenderMiddleware, Request,
    Response,
};
use outpost_telemetry::TelemetryResult;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors raised while assembling an [`Outpost`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The configured default format is not registered.
    #[error("invalid format setup: {0}")]
    Format(#[from] FormatError),
}

/// An assembled dispatch-and-render pipeline.
///
/// Cheap to clone; clones share the pipeline and registries.
///
/// # Example
///
/// ```
/// use outpost::prelude::*;
///
/// let widgets = ServiceDef::new("widgets").resource(
///     RouteResource::new("widget", "/widgets/{id}")
///         .unwrap()
///         .get(FnAction::new(|ctx: &RequestContext| {
///             let id = ctx.params().get("id").unwrap_or_default().to_string();
///             Box::pin(async move { Ok(Entity::typed("widget").with_property("id", id)) })
///         })),
/// );
///
/// let app = Outpost::builder().service(widgets).build().unwrap();
/// assert_eq!(app.stage_names(), vec!["dispatch", "render"]);
/// ```
#[derive(Clone)]
pub struct Outpost {
    pipeline: Arc<Pipeline>,
    config: Arc<OutpostConfig>,
    trust_request_id: bool,
}

impl Outpost {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> OutpostBuilder {
        OutpostBuilder::new()
    }

    /// Returns the configuration the pipeline was built from.
    #[must_use]
    pub fn config(&self) -> &OutpostConfig {
        &self.config
    }

    /// Returns the pipeline stage names in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }

    /// Initializes logging and metrics from the telemetry section.
    ///
    /// Call at most once per process.
    pub fn init_telemetry(&self) -> TelemetryResult<()> {
        outpost_telemetry::init_telemetry(&self.config.telemetry.to_telemetry_config())
    }

    /// Runs `request` through the pipeline, calling `fallback` if no
    /// resource handles it.
    pub async fn handle<F, Fut>(&self, request: Request, fallback: F) -> Response
    where
        F: FnOnce(Request) -> Fut + Send,
        Fut: Future<Output = Response> + Send,
    {
        self.handle_with_abort(request, AbortSignal::never(), fallback)
            .await
    }

    /// Like [`handle`](Self::handle), but a pending action is dropped once
    /// `abort` fires.
    ///
    /// Responses the pipeline produces carry [`REQUEST_ID_HEADER`]; the
    /// fallback's response is returned as the host built it.
    pub async fn handle_with_abort<F, Fut>(
        &self,
        request: Request,
        abort: AbortSignal,
        fallback: F,
    ) -> Response
    where
        F: FnOnce(Request) -> Fut + Send,
        Fut: Future<Output = Response> + Send,
    {
        let request_id = self.request_id(&request);
        let ctx = MiddlewareContext::with_request_id(request_id).with_abort_signal(abort);

        let fell_back = AtomicBool::new(false);
        let mut response = self
            .pipeline
            .process(ctx, request, |_ctx, request| {
                fell_back.store(true, Ordering::Relaxed);
                Box::pin(fallback(request))
            })
            .await;

        // Host responses pass through untouched.
        if fell_back.load(Ordering::Relaxed) {
            return response;
        }
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }

    fn request_id(&self, request: &Request) -> RequestId {
        if self.trust_request_id {
            let incoming = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| Uuid::parse_str(v).ok());
            if let Some(uuid) = incoming {
                return RequestId::from_uuid(uuid);
            }
        }
        RequestId::new()
    }
}

impl std::fmt::Debug for Outpost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outpost")
            .field("pipeline", &self.pipeline)
            .field("trust_request_id", &self.trust_request_id)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Outpost`].
#[derive(Default)]
pub struct OutpostBuilder {
    services: Vec<Arc<dyn Service>>,
    formatters: Vec<(String, Arc<dyn Formatter>)>,
    verifier: Option<Arc<dyn CredentialVerifier>>,
    config: OutpostConfig,
    trust_request_id: bool,
}

impl OutpostBuilder {
    /// Creates a builder with the default configuration, the `json` format
    /// and the extension-based credential verifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service. Services are matched in registration order.
    #[must_use]
    pub fn service(mut self, service: impl Service + 'static) -> Self {
        self.services.push(Arc::new(service));
        self
    }

    /// Registers an already shared service.
    #[must_use]
    pub fn shared_service(mut self, service: Arc<dyn Service>) -> Self {
        self.services.push(service);
        self
    }

    /// Registers (or replaces) a formatter under `name`.
    #[must_use]
    pub fn formatter(mut self, name: impl Into<String>, formatter: impl Formatter + 'static) -> Self {
        self.formatters.push((name.into(), Arc::new(formatter)));
        self
    }

    /// Sets the credential verifier.
    #[must_use]
    pub fn verifier(mut self, verifier: impl CredentialVerifier + 'static) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: OutpostConfig) -> Self {
        self.config = config;
        self
    }

    /// Reuses a valid incoming `x-request-id` instead of generating one.
    #[must_use]
    pub fn trust_request_id(mut self, trust: bool) -> Self {
        self.trust_request_id = trust;
        self
    }

    /// Validates the configuration and assembles the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the configuration is invalid or names a
    /// default format that is not registered.
    pub fn build(self) -> Result<Outpost, BuildError> {
        let config = self.config;
        config.validate()?;

        let registry = self
            .formatters
            .into_iter()
            .fold(FormatterRegistry::new(), |registry, (name, formatter)| {
                registry.register_shared(name, formatter)
            })
            .with_default(&config.render.default_format)?;
        let registry = Arc::new(registry);

        let verifier = self
            .verifier
            .unwrap_or_else(|| Arc::new(ExtensionVerifier));
        let authorizer = Authorizer::new(verifier)
            .with_default_scope(config.auth.scope())
            .with_default_credential_type(config.auth.default_credential_type.clone());

        let base_uri = BaseUriResolver::new(config.base_uri.default_scheme.clone())
            .trust_forwarded_proto(config.base_uri.trust_forwarded_proto)
            .with_root_path(config.base_uri.root_path.clone());

        let defaults = RenderOptions::new(String::new())
            .include_actions(config.render.include_actions)
            .include_links(config.render.include_links)
            .include_embedded(config.render.include_embedded)
            .include_meta(config.render.include_meta);

        let pipeline = Pipeline::builder()
            .stage(DispatchMiddleware::new(
                self.services,
                authorizer,
                ErrorRenderer::new(Arc::clone(&registry)),
            ))
            .stage(
                RenderMiddleware::new(Arc::clone(&registry), base_uri)
                    .with_defaults(defaults)
                    .with_token_param(config.render.token_param.clone()),
            )
            .build();

        tracing::debug!(
            formats = ?registry.names().collect::<Vec<_>>(),
            default_format = registry.default_name(),
            "outpost pipeline assembled"
        );

        Ok(Outpost {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
            trust_request_id: self.trust_request_id,
        })
    }
}
