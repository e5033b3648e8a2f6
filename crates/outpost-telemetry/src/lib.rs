//! Observability for Outpost.
//!
//! - **Logging**: structured JSON (or pretty) output through `tracing-subscriber`
//! - **Metrics**: Prometheus-format metrics through the `metrics` facade
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `outpost_requests_total` | Counter | `outcome` | Requests by pipeline outcome |
//! | `outpost_invoke_duration_seconds` | Histogram | `resource` | Action invocation latency |
//! | `outpost_render_duration_seconds` | Histogram | `format` | Representation rendering latency |
//! | `outpost_auth_failures_total` | Counter | `kind` | Authentication and authorization failures |
//!
//! # Example
//!
//! ```rust,ignore
//! use outpost_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TelemetryConfig::builder()
//!         .service_name("catalog")
//!         .metrics_addr("0.0.0.0:9090")
//!         .build();
//!
//!     init_telemetry(&config)?;
//!     Ok(())
//! }
//! ```
//!
//! Without a listener address, the host scrapes through [`render_metrics`]:
//!
//! ```text
//! # TYPE outpost_requests_total counter
//! outpost_requests_total{outcome="handled"} 1234
//! outpost_requests_total{outcome="not_handled"} 56
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{
    init_metrics, record_auth_failure, record_invoke_duration, record_render_duration,
    record_request, render_metrics, MetricsConfig, RequestOutcome,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_telemetry_initializes() {
        let config = TelemetryConfig {
            metrics: MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            },
            logging: LogConfig {
                enabled: false,
                ..LogConfig::default()
            },
            ..TelemetryConfig::default()
        };
        assert!(init_telemetry(&config).is_ok());
    }

    #[test]
    fn test_render_before_init() {
        assert!(render_metrics().is_none());
    }
}
