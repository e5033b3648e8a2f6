//! Request and response types used throughout the pipeline.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;

/// The HTTP request type the pipeline accepts.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type the pipeline produces.
pub type Response = http::Response<Full<Bytes>>;

/// `Vary` value on every representation the pipeline renders.
pub const VARY_ON: &str = "Authorization, Accept";

/// Constructors for responses the pipeline builds itself.
pub trait ResponseExt {
    /// A bodiless response with the given status.
    fn empty(status: StatusCode) -> Response;

    /// A plain-text response with the given status and message.
    fn error(status: StatusCode, message: &str) -> Response;

    /// A response with a body and content type.
    fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response;
}

impl ResponseExt for Response {
    fn empty(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn error(status: StatusCode, message: &str) -> Response {
        Self::with_body(
            status,
            "text/plain; charset=utf-8",
            Bytes::from(message.to_string()),
        )
    }

    fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_empty_response() {
        let response = Response::empty(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_with_body() {
        let response = Response::with_body(
            StatusCode::CREATED,
            "application/json",
            Bytes::from_static(b"{}"),
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
    }
}
