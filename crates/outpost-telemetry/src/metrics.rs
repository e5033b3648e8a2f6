//! Prometheus metrics for Outpost.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `outpost_requests_total` | Counter | `outcome` | Requests by pipeline outcome |
//! | `outpost_invoke_duration_seconds` | Histogram | `resource` | Action invocation latency |
//! | `outpost_render_duration_seconds` | Histogram | `format` | Representation rendering latency |
//! | `outpost_auth_failures_total` | Counter | `kind` | Authentication and authorization failures |
//!
//! Recording functions are safe to call before [`init_metrics`]; the `metrics`
//! facade discards samples when no recorder is installed.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const REQUESTS_TOTAL: &str = "outpost_requests_total";
const INVOKE_DURATION: &str = "outpost_invoke_duration_seconds";
const RENDER_DURATION: &str = "outpost_render_duration_seconds";
const AUTH_FAILURES: &str = "outpost_auth_failures_total";

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are recorded.
    pub enabled: bool,

    /// Address for a standalone `/metrics` listener (e.g. `"0.0.0.0:9090"`).
    /// `None` installs the recorder only; scrape through [`render_metrics`].
    pub addr: Option<String>,

    /// Histogram buckets for the duration metrics, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: None,
            duration_buckets: vec![
                0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ],
        }
    }
}

/// How a request left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
    /// An action ran and its entity was rendered.
    Handled,
    /// No resource claimed the request; it went to the fallback.
    NotHandled,
    /// The request ended with a rendered error.
    Error,
    /// The host aborted the request before the action completed.
    Aborted,
}

impl RequestOutcome {
    /// Label value for `outpost_requests_total`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Handled => "handled",
            Self::NotHandled => "not_handled",
            Self::Error => "error",
            Self::Aborted => "aborted",
        }
    }
}

/// Installs the Prometheus recorder.
///
/// With a listener address the exporter is spawned on the current Tokio
/// runtime, so this must then be called from within one.
///
/// # Errors
///
/// Returns an error if the address does not parse, there is no runtime for
/// the listener, or a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("_duration_seconds".to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = match &config.addr {
        Some(addr) => {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
            let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
                TelemetryError::MetricsInit("metrics listener requires a Tokio runtime".to_string())
            })?;

            let (recorder, exporter) = builder
                .with_http_listener(addr)
                .build()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
            let handle = recorder.handle();
            metrics::set_global_recorder(recorder).map_err(|_| {
                TelemetryError::MetricsInit("a metrics recorder is already installed".to_string())
            })?;

            runtime.spawn(async move {
                if let Err(e) = exporter.await {
                    tracing::error!(error = ?e, "metrics exporter stopped");
                }
            });
            handle
        }
        None => builder
            .install_recorder()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?,
    };

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();
    Ok(())
}

/// Renders metrics in Prometheus text format, or `None` before [`init_metrics`].
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Requests processed, by pipeline outcome");
    describe_histogram!(
        INVOKE_DURATION,
        metrics::Unit::Seconds,
        "Action invocation duration in seconds"
    );
    describe_histogram!(
        RENDER_DURATION,
        metrics::Unit::Seconds,
        "Representation rendering duration in seconds"
    );
    describe_counter!(AUTH_FAILURES, "Authentication and authorization failures");
}

/// Counts a request by outcome.
pub fn record_request(outcome: RequestOutcome) {
    counter!(REQUESTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// Observes how long an action took.
pub fn record_invoke_duration(resource: &str, duration: Duration) {
    histogram!(INVOKE_DURATION, "resource" => resource.to_string()).record(duration.as_secs_f64());
}

/// Observes how long rendering took.
pub fn record_render_duration(format: &str, duration: Duration) {
    histogram!(RENDER_DURATION, "format" => format.to_string()).record(duration.as_secs_f64());
}

/// Counts an authentication (`"authentication"`) or authorization
/// (`"authorization"`) failure.
pub fn record_auth_failure(kind: &'static str) {
    counter!(AUTH_FAILURES, "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(config.addr.is_none());
        assert!(config.duration_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RequestOutcome::Handled.as_str(), "handled");
        assert_eq!(RequestOutcome::NotHandled.as_str(), "not_handled");
        assert_eq!(RequestOutcome::Error.as_str(), "error");
        assert_eq!(RequestOutcome::Aborted.as_str(), "aborted");
    }

    #[test]
    fn test_record_functions_without_recorder() {
        record_request(RequestOutcome::Handled);
        record_invoke_duration("widget", Duration::from_millis(3));
        record_render_duration("json", Duration::from_micros(250));
        record_auth_failure("authentication");
    }

    #[test]
    fn test_disabled_metrics_is_noop() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let config = MetricsConfig {
            addr: Some("not-an-address".to_string()),
            ..MetricsConfig::default()
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_listener_requires_runtime() {
        let config = MetricsConfig {
            addr: Some("127.0.0.1:0".to_string()),
            ..MetricsConfig::default()
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::MetricsInit(_))
        ));
    }
}
