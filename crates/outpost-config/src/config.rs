//! The top-level [`OutpostConfig`] and its builder.

use serde::{Deserialize, Serialize};

use crate::{AuthSection, BaseUriSection, ConfigError, LogFormat, RenderSection, TelemetrySection};

/// Complete Outpost configuration.
///
/// # Example
///
/// ```
/// use outpost_config::OutpostConfig;
///
/// let config = OutpostConfig::default();
/// assert_eq!(config.render.default_format, "json");
/// assert_eq!(config.auth.default_scope, vec!["me"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutpostConfig {
    /// Rendering defaults.
    #[serde(default)]
    pub render: RenderSection,

    /// Authorization defaults.
    #[serde(default)]
    pub auth: AuthSection,

    /// Base URI derivation.
    #[serde(default)]
    pub base_uri: BaseUriSection,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl OutpostConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> OutpostConfigBuilder {
        OutpostConfigBuilder::new()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `render.default_format` or `render.token_param` is empty
    /// - `auth.default_credential_type` is empty
    /// - `base_uri.default_scheme` is not `http` or `https`
    /// - `base_uri.root_path` does not start with `/`
    /// - `telemetry.metrics.addr` is not a socket address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.default_format.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "render.default_format",
                "must not be empty",
            ));
        }
        if self.render.token_param.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "render.token_param",
                "must not be empty",
            ));
        }
        if self.auth.default_credential_type.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "auth.default_credential_type",
                "must not be empty",
            ));
        }

        if !matches!(self.base_uri.default_scheme.as_str(), "http" | "https") {
            return Err(ConfigError::invalid_value(
                "base_uri.default_scheme",
                format!("expected http or https, got {}", self.base_uri.default_scheme),
            ));
        }
        if let Some(root) = &self.base_uri.root_path {
            if !root.starts_with('/') {
                return Err(ConfigError::invalid_value(
                    "base_uri.root_path",
                    format!("must start with '/': {root}"),
                ));
            }
        }

        if let Some(addr) = &self.telemetry.metrics.addr {
            if self.telemetry.metrics.enabled && addr.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.addr",
                    format!("invalid socket address: {addr}"),
                ));
            }
        }

        Ok(())
    }

    /// Pretty debug logging.
    ///
    /// ```
    /// use outpost_config::{LogFormat, OutpostConfig};
    ///
    /// let config = OutpostConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config
    }

    /// JSON info logging, https by default.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.base_uri.default_scheme = "https".to_string();
        config
    }
}

/// Builder for [`OutpostConfig`].
#[derive(Debug, Default)]
pub struct OutpostConfigBuilder {
    render: Option<RenderSection>,
    auth: Option<AuthSection>,
    base_uri: Option<BaseUriSection>,
    telemetry: Option<TelemetrySection>,
}

impl OutpostConfigBuilder {
    /// Creates a builder with default sections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the render section.
    #[must_use]
    pub fn render(mut self, render: RenderSection) -> Self {
        self.render = Some(render);
        self
    }

    /// Sets the auth section.
    #[must_use]
    pub fn auth(mut self, auth: AuthSection) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the base URI section.
    #[must_use]
    pub fn base_uri(mut self, base_uri: BaseUriSection) -> Self {
        self.base_uri = Some(base_uri);
        self
    }

    /// Sets the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Builds the configuration without validating it.
    #[must_use]
    pub fn build(self) -> OutpostConfig {
        OutpostConfig {
            render: self.render.unwrap_or_default(),
            auth: self.auth.unwrap_or_default(),
            base_uri: self.base_uri.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }
}
