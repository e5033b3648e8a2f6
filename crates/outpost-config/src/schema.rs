//! Configuration schema types.
//!
//! Every section rejects unknown fields and fills missing ones with defaults.

use outpost_core::Scope;
use outpost_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

/// Rendering defaults.
///
/// # Example
///
/// ```
/// use outpost_config::RenderSection;
///
/// let render = RenderSection::default();
/// assert_eq!(render.default_format, "json");
/// assert_eq!(render.token_param, "access_token");
/// assert!(render.include_links);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    /// Format used when the client expresses no usable preference.
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Query parameter forwarded onto generated links by formats that need it.
    #[serde(default = "default_token_param")]
    pub token_param: String,

    /// Emit `_actions` unless the request turns it off.
    #[serde(default = "default_true")]
    pub include_actions: bool,

    /// Emit `_links` unless the request turns it off.
    #[serde(default = "default_true")]
    pub include_links: bool,

    /// Emit `_embedded` unless the request turns it off.
    #[serde(default = "default_true")]
    pub include_embedded: bool,

    /// Emit `_meta` unless the request turns it off.
    #[serde(default = "default_true")]
    pub include_meta: bool,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            token_param: default_token_param(),
            include_actions: true,
            include_links: true,
            include_embedded: true,
            include_meta: true,
        }
    }
}

fn default_format() -> String {
    "json".to_string()
}

fn default_token_param() -> String {
    "access_token".to_string()
}

/// Authorization defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Scope granted to an identity-only credential that carries none.
    #[serde(default = "default_scope")]
    pub default_scope: Vec<String>,

    /// Credential type verified when an action does not name one.
    #[serde(default = "default_credential_type")]
    pub default_credential_type: String,
}

impl AuthSection {
    /// Returns the default scope as a [`Scope`].
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.default_scope.iter().cloned().collect()
    }
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            default_scope: default_scope(),
            default_credential_type: default_credential_type(),
        }
    }
}

fn default_scope() -> Vec<String> {
    vec!["me".to_string()]
}

fn default_credential_type() -> String {
    "bearer".to_string()
}

/// How the per-request base URI is derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BaseUriSection {
    /// Scheme used when no forwarded protocol is trusted or present.
    #[serde(default = "default_scheme")]
    pub default_scheme: String,

    /// Honour `x-forwarded-proto`.
    #[serde(default = "default_true")]
    pub trust_forwarded_proto: bool,

    /// Root path used when the request has no `x-api-root-path` header.
    #[serde(default)]
    pub root_path: Option<String>,
}

impl Default for BaseUriSection {
    fn default() -> Self {
        Self {
            default_scheme: default_scheme(),
            trust_forwarded_proto: true,
            root_path: None,
        }
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. `info`, `outpost_middleware=debug,info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Enable metrics.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Standalone Prometheus listener address. Unset means recorder only.
    #[serde(default)]
    pub addr: Option<String>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: None,
        }
    }
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name attached to logs.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl TelemetrySection {
    /// Converts into the configuration `outpost-telemetry` initializes from.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        let logging = LogConfig {
            enabled: self.logging.enabled,
            ..base.with_level(self.logging.level.clone())
        };

        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .logging(logging)
            .metrics(MetricsConfig {
                enabled: self.metrics.enabled,
                addr: self.metrics.addr.clone(),
                ..MetricsConfig::default()
            })
            .build()
    }
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

fn default_service_name() -> String {
    "outpost".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_scope_conversion() {
        let auth = AuthSection {
            default_scope: vec!["me".to_string(), "profile".to_string()],
            ..AuthSection::default()
        };
        let scope = auth.scope();
        assert!(scope.contains("me"));
        assert!(scope.contains("profile"));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn test_render_section_rejects_unknown_fields() {
        let result: Result<RenderSection, _> = toml::from_str("include_everything = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let base: BaseUriSection = toml::from_str(r#"root_path = "/api""#).unwrap();
        assert_eq!(base.default_scheme, "http");
        assert!(base.trust_forwarded_proto);
        assert_eq!(base.root_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_log_format_serde() {
        let logging: LoggingSection = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_to_telemetry_config() {
        let section = TelemetrySection {
            service_name: "catalog".to_string(),
            logging: LoggingSection {
                enabled: true,
                level: "warn".to_string(),
                format: LogFormat::Pretty,
            },
            metrics: MetricsSection {
                enabled: true,
                addr: Some("127.0.0.1:9090".to_string()),
            },
        };

        let config = section.to_telemetry_config();
        assert_eq!(config.service_name, "catalog");
        assert_eq!(config.logging.service_name, "catalog");
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json_format);
        assert_eq!(config.metrics.addr.as_deref(), Some("127.0.0.1:9090"));
    }
}
