//! Authorization types.
//!
//! The authentication subsystem is external: it hands Outpost a
//! [`VerifiedCredential`]. Outpost turns that into the [`AuthContext`] an
//! action sees, and checks it against the action's [`AuthRequirement`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A set of scope strings.
///
/// ```
/// use outpost_core::Scope;
///
/// let granted = Scope::parse("read write");
/// let required = Scope::from_iter(["read", "admin"]);
///
/// assert!(granted.contains("read"));
/// assert_eq!(granted.missing(&required), vec!["admin".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(BTreeSet<String>);

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a space-delimited scope string, ignoring empty tokens.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        value.split_whitespace().collect()
    }

    /// Returns true if `scope` is granted.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    /// Returns the entries of `required` that this scope does not grant.
    #[must_use]
    pub fn missing(&self, required: &Scope) -> Vec<String> {
        required.0.difference(&self.0).cloned().collect()
    }

    /// Returns true if no scope is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of scope strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the scope strings in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Scope {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(" "))
    }
}

/// The authorization context an action is invoked under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    /// No credential.
    #[default]
    Anonymous,
    /// An end user acting directly.
    Identity {
        /// User identifier.
        identity: String,
        /// Granted scope.
        scope: Scope,
    },
    /// An end user acting through a client application.
    Delegated {
        /// User identifier.
        identity: String,
        /// Client identifier.
        client: String,
        /// Granted scope.
        scope: Scope,
    },
    /// A client acting on its own behalf.
    Client {
        /// Client identifier.
        client: String,
        /// Granted scope.
        scope: Scope,
    },
}

impl AuthContext {
    /// Returns the end-user identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Identity { identity, .. } | Self::Delegated { identity, .. } => Some(identity),
            Self::Anonymous | Self::Client { .. } => None,
        }
    }

    /// Returns the client identity, if any.
    #[must_use]
    pub fn client(&self) -> Option<&str> {
        match self {
            Self::Delegated { client, .. } | Self::Client { client, .. } => Some(client),
            Self::Anonymous | Self::Identity { .. } => None,
        }
    }

    /// Returns the granted scope, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&Scope> {
        match self {
            Self::Identity { scope, .. }
            | Self::Delegated { scope, .. }
            | Self::Client { scope, .. } => Some(scope),
            Self::Anonymous => None,
        }
    }

    /// Returns true for [`AuthContext::Anonymous`].
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns a short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Identity { .. } => "identity",
            Self::Delegated { .. } => "delegated",
            Self::Client { .. } => "client",
        }
    }
}

/// What an action demands of the caller.
///
/// A requirement without a scope does not trigger verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequirement {
    /// Credential type to verify with; `None` uses the configured default.
    pub credential_type: Option<String>,
    /// Scope the caller must hold.
    pub scope: Option<Scope>,
}

impl AuthRequirement {
    /// Requires the given scope strings.
    #[must_use]
    pub fn scope<I, S>(scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            credential_type: None,
            scope: Some(scope.into_iter().collect()),
        }
    }

    /// Sets the credential type.
    #[must_use]
    pub fn with_credential_type(mut self, credential_type: impl Into<String>) -> Self {
        self.credential_type = Some(credential_type.into());
        self
    }

    /// Returns true if this requirement forces credential verification.
    #[must_use]
    pub const fn requires_verification(&self) -> bool {
        self.scope.is_some()
    }
}

/// The output of the external authentication subsystem.
///
/// Hosts attach this to the request's extensions after authenticating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedCredential {
    /// End-user identity.
    pub identity: Option<String>,
    /// Client identity.
    pub client: Option<String>,
    /// Scope carried by the credential.
    pub scope: Option<Scope>,
}

impl VerifiedCredential {
    /// A credential for an end user.
    #[must_use]
    pub fn user(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            ..Self::default()
        }
    }

    /// A client-only credential.
    #[must_use]
    pub fn client(client: impl Into<String>) -> Self {
        Self {
            client: Some(client.into()),
            ..Self::default()
        }
    }

    /// Sets the client the user acts through.
    #[must_use]
    pub fn via_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Sets the scope carried by the credential.
    #[must_use]
    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().collect());
        self
    }
}
