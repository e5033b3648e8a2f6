//! Error types for Outpost.
//!
//! [`OutpostError`] is what actions return on failure and what the pipeline
//! raises for authentication, authorization and rendering problems. Every
//! error converts to the same wire envelope, [`ErrorEnvelope`], regardless of
//! the response format chosen for the request.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`OutpostError`].
pub type OutpostResult<T> = Result<T, OutpostError>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed request input (unparseable body, bad parameters).
    Validation,
    /// Missing or invalid credentials.
    Authentication,
    /// Credentials valid but insufficient scope.
    Authorization,
    /// The addressed entity does not exist.
    NotFound,
    /// Concurrent modification or state conflict.
    Conflict,
    /// Anything the server could not handle, including render failures.
    Internal,
    /// An action-declared status that fits no other category.
    Custom,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal | Self::Custom => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Outpost.
///
/// # Example
///
/// ```
/// use outpost_core::OutpostError;
/// use http::StatusCode;
///
/// let err = OutpostError::not_found("widget 7 not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(err.message(), "widget 7 not found");
///
/// let teapot = OutpostError::with_status(StatusCode::IM_A_TEAPOT, "short and stout");
/// assert_eq!(teapot.status_code().as_u16(), 418);
/// ```
#[derive(Error, Debug)]
pub enum OutpostError {
    /// Request input could not be interpreted.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Credential verification failed or no credential was supplied.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// The derived scope does not cover what the action requires.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
        /// Scope strings the caller was missing.
        missing_scope: Vec<String>,
    },

    /// The addressed entity does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// State conflict.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Failure with an explicit status chosen by the action.
    #[error("{status}: {message}")]
    Status {
        /// Status to respond with.
        status: StatusCode,
        /// Human-readable error message.
        message: String,
    },
}

impl OutpostError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            missing_scope: Vec::new(),
        }
    }

    /// Creates an authorization error naming the scope strings that were missing.
    #[must_use]
    pub fn insufficient_scope(missing_scope: Vec<String>) -> Self {
        Self::Authorization {
            message: format!("missing required scope: {}", missing_scope.join(" ")),
            missing_scope,
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an error carrying an explicit status.
    ///
    /// Statuses that map onto a known category are normalised to that
    /// category so that codes stay stable; anything else keeps the status
    /// verbatim. Non-error statuses are coerced to 500.
    #[must_use]
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::BAD_REQUEST => Self::validation(message),
            StatusCode::UNAUTHORIZED => Self::authentication(message),
            StatusCode::FORBIDDEN => Self::authorization(message),
            StatusCode::NOT_FOUND => Self::not_found(message),
            StatusCode::CONFLICT => Self::conflict(message),
            StatusCode::INTERNAL_SERVER_ERROR => Self::internal(message),
            s if s.is_client_error() || s.is_server_error() => Self::Status { status, message },
            _ => Self::internal(message),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Status { .. } => ErrorCategory::Custom,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            other => other.category().default_status_code(),
        }
    }

    /// Returns the client-facing message, without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Authentication { message }
            | Self::Authorization { message, .. }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Internal { message, .. }
            | Self::Status { message, .. } => message,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Status { .. } => "ACTION_FAILED",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let details = match self {
            Self::Authorization { missing_scope, .. } if !missing_scope.is_empty() => {
                Some(serde_json::json!({ "missing_scope": missing_scope }))
            }
            _ => None,
        };

        ErrorEnvelope {
            kind: ErrorEnvelope::TYPE.to_string(),
            status: self.status_code().as_u16(),
            message: self.message().to_string(),
            code: self.error_code().to_string(),
            details,
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Serializable error body shared by every response format.
///
/// ```json
/// { "_type": "error", "status": 404, "message": "widget not found", "code": "NOT_FOUND" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `"error"`.
    #[serde(rename = "_type")]
    pub kind: String,
    /// Numeric HTTP status.
    pub status: u16,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    /// Value of the `_type` field.
    pub const TYPE: &'static str = "error";

    /// Returns the envelope status as a [`StatusCode`], falling back to 500.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_map_to_error_statuses() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::Authentication,
            ErrorCategory::Authorization,
            ErrorCategory::NotFound,
            ErrorCategory::Conflict,
            ErrorCategory::Internal,
            ErrorCategory::Custom,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }

    #[test]
    fn test_message_has_no_prefix() {
        let error = OutpostError::not_found("not found");
        assert_eq!(error.message(), "not found");
        assert_eq!(error.to_string(), "Not found: not found");
    }

    #[test]
    fn test_with_status_normalises_known_statuses() {
        let error = OutpostError::with_status(StatusCode::NOT_FOUND, "gone");
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(error.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_with_status_keeps_custom_statuses() {
        let error = OutpostError::with_status(StatusCode::UNPROCESSABLE_ENTITY, "bad state");
        assert_eq!(error.category(), ErrorCategory::Custom);
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_with_status_coerces_success_to_internal() {
        let error = OutpostError::with_status(StatusCode::OK, "not an error");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_insufficient_scope_details() {
        let error = OutpostError::insufficient_scope(vec!["admin".to_string()]);
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);

        let envelope = error.to_envelope(None);
        assert_eq!(envelope.details.unwrap()["missing_scope"][0], "admin");
    }

    #[test]
    fn test_internal_source_is_not_exposed() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = OutpostError::internal_with_source("storage failure", io);
        let envelope = error.to_envelope(None);

        assert_eq!(envelope.message, "storage failure");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = OutpostError::not_found("not found").to_envelope(Some("req-1"));
        let json = serde_json::to_value(&envelope).expect("serialization should work");

        assert_eq!(json["_type"], "error");
        assert_eq!(json["status"], 404);
        assert_eq!(json["message"], "not found");
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["request_id"], "req-1");
        assert!(json.get("details").is_none());
    }
}
