//! Invocation context types.
//!
//! A [`RequestContext`] is built once per dispatched request and handed to
//! the action by reference. Only the response status can be changed by the
//! action; everything else is fixed before invocation.

use crate::auth::AuthContext;
use http::StatusCode;
use outpost_router::Params;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU16, Ordering};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate and sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters available to an action.
///
/// URI parameters extracted by the resource pattern live apart from the
/// `input` map built from query string and body, and win on lookup.
///
/// ```
/// use outpost_core::RequestParams;
/// use outpost_router::Params;
/// use serde_json::json;
///
/// let mut uri = Params::new();
/// uri.bind("id", "7");
///
/// let input = json!({ "id": "99", "color": "red" });
/// let params = RequestParams::new(uri, input.as_object().unwrap().clone());
///
/// assert_eq!(params.get("id"), Some("7"));
/// assert_eq!(params.get("color"), Some("red"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    uri: Params,
    input: serde_json::Map<String, serde_json::Value>,
}

impl RequestParams {
    /// Creates a parameter set.
    #[must_use]
    pub fn new(uri: Params, input: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { uri, input }
    }

    /// Parameters extracted from the URI pattern.
    #[must_use]
    pub const fn uri(&self) -> &Params {
        &self.uri
    }

    /// Query and body values merged into one map.
    #[must_use]
    pub const fn input(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.input
    }

    /// Looks up a string parameter, URI first, then string values in `input`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.uri
            .get(name)
            .or_else(|| self.input.get(name).and_then(serde_json::Value::as_str))
    }

    /// Looks up any parameter as a JSON value, URI first.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<serde_json::Value> {
        self.uri
            .get(name)
            .map(|v| serde_json::Value::String(v.to_string()))
            .or_else(|| self.input.get(name).cloned())
    }

    /// Deserializes the `input` map into a typed value.
    pub fn input_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.input.clone()))
    }
}

/// Per-request invocation context.
///
/// # Example
///
/// ```
/// use outpost_core::{AuthContext, RequestContext, Scope};
/// use http::StatusCode;
///
/// let ctx = RequestContext::new().with_auth(AuthContext::Identity {
///     identity: "alice".to_string(),
///     scope: Scope::from_iter(["me"]),
/// });
///
/// assert_eq!(ctx.status(), StatusCode::OK);
/// ctx.set_status(StatusCode::CREATED);
/// assert_eq!(ctx.status(), StatusCode::CREATED);
/// assert_eq!(ctx.auth().identity(), Some("alice"));
/// ```
#[derive(Debug)]
pub struct RequestContext {
    request_id: RequestId,
    status: AtomicU16,
    auth: AuthContext,
    params: RequestParams,
}

impl RequestContext {
    /// Creates a context with status 200, anonymous auth and no parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            status: AtomicU16::new(StatusCode::OK.as_u16()),
            auth: AuthContext::Anonymous,
            params: RequestParams::default(),
        }
    }

    /// Sets the authorization context.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the parameters.
    #[must_use]
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the response status the action has chosen so far.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status.load(Ordering::Acquire)).unwrap_or(StatusCode::OK)
    }

    /// Changes the response status for a successful invocation.
    pub fn set_status(&self, status: StatusCode) {
        self.status.store(status.as_u16(), Ordering::Release);
    }

    /// Returns the authorization context.
    #[must_use]
    pub const fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Returns the parameters.
    #[must_use]
    pub const fn params(&self) -> &RequestParams {
        &self.params
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
