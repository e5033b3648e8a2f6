//! Error rendering.
//!
//! Failures from either stage are turned into an [`ErrorEnvelope`] and
//! rendered by the same negotiated formatter a successful entity would have
//! used, so a client asking for HAL gets HAL errors.
//!
//! [`ErrorEnvelope`]: outpost_core::ErrorEnvelope

use crate::context::MiddlewareContext;
use crate::types::{Response, ResponseExt, VARY_ON};
use http::header::{HeaderValue, VARY};
use outpost_core::OutpostError;
use outpost_format::FormatterRegistry;
use outpost_telemetry::metrics::{self, RequestOutcome};
use std::sync::Arc;

/// Renders [`OutpostError`]s into responses.
#[derive(Debug, Clone)]
pub struct ErrorRenderer {
    registry: Arc<FormatterRegistry>,
}

impl ErrorRenderer {
    /// Creates a renderer over the shared formatter registry.
    #[must_use]
    pub const fn new(registry: Arc<FormatterRegistry>) -> Self {
        Self { registry }
    }

    /// Renders `error` in the format negotiated from `accept`.
    ///
    /// Falls back to a plain-text body if the formatter itself fails.
    pub fn render(
        &self,
        ctx: &MiddlewareContext,
        accept: Option<&str>,
        error: &OutpostError,
    ) -> Response {
        let request_id = ctx.request_id().to_string();
        let status = error.status_code();

        if status.is_server_error() {
            outpost_telemetry::log_request_error!(request_id, status.as_u16(), error);
        } else if matches!(status.as_u16(), 401 | 403) {
            tracing::warn!(
                request_id = %request_id,
                http.status_code = status.as_u16(),
                code = error.error_code(),
                "request rejected"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                http.status_code = status.as_u16(),
                code = error.error_code(),
                "action failed"
            );
        }
        metrics::record_request(RequestOutcome::Error);

        let envelope = error.to_envelope(Some(&request_id));
        let negotiated = self.registry.negotiate(accept);
        match negotiated.formatter.format_error(&envelope) {
            Ok(body) => {
                let mut response =
                    Response::with_body(status, negotiated.formatter.content_type(), body);
                response
                    .headers_mut()
                    .insert(VARY, HeaderValue::from_static(VARY_ON));
                response
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    format = negotiated.name,
                    error = %e,
                    "error envelope could not be formatted"
                );
                Response::error(status, error.message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use outpost_format::{Formatter, HalFormatter};

    fn renderer() -> ErrorRenderer {
        ErrorRenderer::new(Arc::new(
            FormatterRegistry::new().register("hal", HalFormatter),
        ))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let ctx = MiddlewareContext::new();
        let response = renderer().render(&ctx, None, &OutpostError::not_found("no such widget"));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[VARY], VARY_ON);
        let body = body_json(response).await;
        assert_eq!(body["_type"], "error");
        assert_eq!(body["status"], 404);
        assert_eq!(body["message"], "no such widget");
        assert_eq!(body["request_id"], ctx.request_id().to_string());
    }

    #[tokio::test]
    async fn test_error_uses_negotiated_format() {
        let ctx = MiddlewareContext::new();
        let response = renderer().render(
            &ctx,
            Some("application/hal+json"),
            &OutpostError::validation("bad input"),
        );

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            HalFormatter.content_type()
        );
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_custom_status_is_preserved() {
        let ctx = MiddlewareContext::new();
        let error = OutpostError::with_status(StatusCode::IM_A_TEAPOT, "short and stout");
        let response = renderer().render(&ctx, None, &error);
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
