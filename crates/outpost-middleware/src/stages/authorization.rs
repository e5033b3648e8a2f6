//! Authorization context builder.
//!
//! Runs inside the dispatch stage once an action has been resolved, because
//! what it checks depends on the action's declared requirement:
//!
//! - No required scope: the context is derived from whatever credential the
//!   host already attached to the request, or left anonymous.
//! - A required scope: the credential is verified (with the declared type or
//!   the configured default). Failure is an authentication error (401). The
//!   derived scope must then contain every required entry, otherwise the
//!   request fails with an authorization error (403).
//!
//! Derivation, in priority order:
//!
//! | Credential carries | Context |
//! |--------------------|---------|
//! | identity + client | `Delegated`, credential scope |
//! | client only | `Client`, credential scope |
//! | identity only | `Identity`, credential scope or the default scope |
//! | nothing | `Anonymous` |

use crate::types::Request;
use async_trait::async_trait;
use outpost_core::{
    AuthContext, AuthRequirement, OutpostError, OutpostResult, Scope, VerifiedCredential,
};
use outpost_telemetry::metrics;
use std::sync::Arc;

/// The boundary to the host's authentication subsystem.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verifies the request's credential of the given type.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if no valid credential is present.
    async fn verify(
        &self,
        credential_type: &str,
        request: &Request,
    ) -> OutpostResult<VerifiedCredential>;
}

/// Accepts the [`VerifiedCredential`] the host attached to the request's
/// extensions, whatever the requested type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionVerifier;

#[async_trait]
impl CredentialVerifier for ExtensionVerifier {
    async fn verify(
        &self,
        credential_type: &str,
        request: &Request,
    ) -> OutpostResult<VerifiedCredential> {
        request
            .extensions()
            .get::<VerifiedCredential>()
            .cloned()
            .ok_or_else(|| {
                OutpostError::authentication(format!("{credential_type} credential required"))
            })
    }
}

/// Derives an [`AuthContext`] from a verified credential.
///
/// ```
/// use outpost_core::{AuthContext, Scope, VerifiedCredential};
/// use outpost_middleware::stages::authorization::derive_auth_context;
///
/// let default_scope = Scope::parse("me");
///
/// let user = VerifiedCredential::user("alice");
/// assert_eq!(
///     derive_auth_context(&user, &default_scope),
///     AuthContext::Identity { identity: "alice".into(), scope: Scope::parse("me") },
/// );
///
/// let delegated = VerifiedCredential::user("alice").via_client("app").with_scope(["read"]);
/// assert_eq!(derive_auth_context(&delegated, &default_scope).kind(), "delegated");
/// ```
#[must_use]
pub fn derive_auth_context(credential: &VerifiedCredential, default_scope: &Scope) -> AuthContext {
    let scope = credential.scope.clone();
    match (&credential.identity, &credential.client) {
        (Some(identity), Some(client)) => AuthContext::Delegated {
            identity: identity.clone(),
            client: client.clone(),
            scope: scope.unwrap_or_default(),
        },
        (None, Some(client)) => AuthContext::Client {
            client: client.clone(),
            scope: scope.unwrap_or_default(),
        },
        (Some(identity), None) => AuthContext::Identity {
            identity: identity.clone(),
            scope: scope.unwrap_or_else(|| default_scope.clone()),
        },
        (None, None) => AuthContext::Anonymous,
    }
}

/// Builds the authorization context for a resolved action.
#[derive(Clone)]
pub struct Authorizer {
    verifier: Arc<dyn CredentialVerifier>,
    default_scope: Scope,
    default_credential_type: String,
}

impl Authorizer {
    /// Creates an authorizer with default scope `me` and credential type
    /// `bearer`.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            default_scope: Scope::parse("me"),
            default_credential_type: "bearer".to_string(),
        }
    }

    /// Sets the scope granted to identity-only credentials that carry none.
    #[must_use]
    pub fn with_default_scope(mut self, scope: Scope) -> Self {
        self.default_scope = scope;
        self
    }

    /// Sets the credential type verified when an action does not name one.
    #[must_use]
    pub fn with_default_credential_type(mut self, credential_type: impl Into<String>) -> Self {
        self.default_credential_type = credential_type.into();
        self
    }

    /// Returns the default scope.
    #[must_use]
    pub const fn default_scope(&self) -> &Scope {
        &self.default_scope
    }

    /// Derives the context the action will be invoked under.
    ///
    /// # Errors
    ///
    /// Returns an authentication error when verification fails or yields no
    /// principal, and an authorization error when the derived scope lacks a
    /// required entry.
    pub async fn authorize(
        &self,
        requirement: Option<&AuthRequirement>,
        request: &Request,
    ) -> OutpostResult<AuthContext> {
        let Some(required) = requirement.and_then(|r| r.scope.as_ref()) else {
            return Ok(request
                .extensions()
                .get::<VerifiedCredential>()
                .map_or(AuthContext::Anonymous, |c| {
                    derive_auth_context(c, &self.default_scope)
                }));
        };

        let credential_type = requirement
            .and_then(|r| r.credential_type.as_deref())
            .unwrap_or(&self.default_credential_type);

        let credential = match self.verifier.verify(credential_type, request).await {
            Ok(credential) => credential,
            Err(e) => {
                metrics::record_auth_failure("authentication");
                tracing::warn!(credential_type, error = %e, "credential verification failed");
                return Err(e);
            }
        };

        let auth = derive_auth_context(&credential, &self.default_scope);
        let Some(granted) = auth.scope() else {
            metrics::record_auth_failure("authentication");
            tracing::warn!(credential_type, "verified credential names no principal");
            return Err(OutpostError::authentication("credential names no principal"));
        };

        let missing = granted.missing(required);
        if !missing.is_empty() {
            metrics::record_auth_failure("authorization");
            tracing::warn!(
                auth = auth.kind(),
                missing = %missing.join(" "),
                "insufficient scope"
            );
            return Err(OutpostError::insufficient_scope(missing));
        }

        Ok(auth)
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("default_scope", &self.default_scope)
            .field("default_credential_type", &self.default_credential_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::Mutex;

    fn request(credential: Option<VerifiedCredential>) -> Request {
        let mut request = http::Request::builder()
            .uri("/orders")
            .body(Full::new(Bytes::new()))
            .unwrap();
        if let Some(credential) = credential {
            request.extensions_mut().insert(credential);
        }
        request
    }

    fn authorizer() -> Authorizer {
        Authorizer::new(Arc::new(ExtensionVerifier))
    }

    /// Records the credential type it was asked for.
    struct RecordingVerifier {
        seen: Mutex<Vec<String>>,
        credential: VerifiedCredential,
    }

    #[async_trait]
    impl CredentialVerifier for RecordingVerifier {
        async fn verify(&self, credential_type: &str, _: &Request) -> OutpostResult<VerifiedCredential> {
            self.seen.lock().unwrap().push(credential_type.to_string());
            Ok(self.credential.clone())
        }
    }

    #[test]
    fn test_derive_delegated() {
        let credential = VerifiedCredential::user("alice")
            .via_client("mobile")
            .with_scope(["orders"]);
        let auth = derive_auth_context(&credential, &Scope::parse("me"));
        assert_eq!(
            auth,
            AuthContext::Delegated {
                identity: "alice".to_string(),
                client: "mobile".to_string(),
                scope: Scope::parse("orders"),
            }
        );
    }

    #[test]
    fn test_derive_client_without_scope_gets_empty_scope() {
        let auth = derive_auth_context(&VerifiedCredential::client("billing"), &Scope::parse("me"));
        assert_eq!(
            auth,
            AuthContext::Client {
                client: "billing".to_string(),
                scope: Scope::new(),
            }
        );
    }

    #[test]
    fn test_derive_identity_uses_default_scope() {
        let auth = derive_auth_context(&VerifiedCredential::user("bob"), &Scope::parse("me"));
        assert_eq!(auth.scope(), Some(&Scope::parse("me")));

        let scoped = VerifiedCredential::user("bob").with_scope(["admin"]);
        let auth = derive_auth_context(&scoped, &Scope::parse("me"));
        assert_eq!(auth.scope(), Some(&Scope::parse("admin")));
    }

    #[test]
    fn test_derive_empty_credential_is_anonymous() {
        let auth = derive_auth_context(&VerifiedCredential::default(), &Scope::parse("me"));
        assert!(auth.is_anonymous());
    }

    #[tokio::test]
    async fn test_no_requirement_uses_ambient_credential() {
        let auth = authorizer()
            .authorize(None, &request(Some(VerifiedCredential::user("alice"))))
            .await
            .unwrap();
        assert_eq!(auth.identity(), Some("alice"));

        let anonymous = authorizer().authorize(None, &request(None)).await.unwrap();
        assert!(anonymous.is_anonymous());
    }

    #[tokio::test]
    async fn test_requirement_without_credential_is_401() {
        let requirement = AuthRequirement::scope(["me"]);
        let err = authorizer()
            .authorize(Some(&requirement), &request(None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "bearer credential required");
    }

    #[tokio::test]
    async fn test_missing_scope_is_403() {
        let requirement = AuthRequirement::scope(["orders", "admin"]);
        let credential = VerifiedCredential::user("alice").with_scope(["orders"]);
        let err = authorizer()
            .authorize(Some(&requirement), &request(Some(credential)))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let envelope = err.to_envelope(None);
        assert_eq!(
            envelope.details,
            Some(serde_json::json!({ "missing_scope": ["admin"] }))
        );
    }

    #[tokio::test]
    async fn test_default_scope_satisfies_requirement() {
        let requirement = AuthRequirement::scope(["me"]);
        let auth = authorizer()
            .authorize(Some(&requirement), &request(Some(VerifiedCredential::user("alice"))))
            .await
            .unwrap();
        assert_eq!(auth.kind(), "identity");
    }

    #[tokio::test]
    async fn test_empty_credential_is_401() {
        let requirement = AuthRequirement::scope(Vec::<String>::new());
        let err = authorizer()
            .authorize(Some(&requirement), &request(Some(VerifiedCredential::default())))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_credential_type_selection() {
        let verifier = Arc::new(RecordingVerifier {
            seen: Mutex::new(Vec::new()),
            credential: VerifiedCredential::client("svc").with_scope(["jobs"]),
        });
        let authorizer = Authorizer::new(verifier.clone()).with_default_credential_type("basic");

        let implicit = AuthRequirement::scope(["jobs"]);
        let explicit = AuthRequirement::scope(["jobs"]).with_credential_type("mtls");
        authorizer.authorize(Some(&implicit), &request(None)).await.unwrap();
        authorizer.authorize(Some(&explicit), &request(None)).await.unwrap();

        assert_eq!(*verifier.seen.lock().unwrap(), vec!["basic", "mtls"]);
    }
}
