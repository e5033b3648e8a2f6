//! Typed configuration for Outpost.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (unknown fields are rejected)
//! - Layered loading (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use outpost_config::ConfigLoader;
//!
//! # fn main() -> Result<(), outpost_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("outpost.toml")?
//!     .with_env_prefix("OUTPOST")
//!     .load()?;
//!
//! println!("default format: {}", config.render.default_format);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [render]
//! default_format = "json"
//! token_param = "access_token"
//! include_actions = true
//! include_links = true
//! include_embedded = true
//! include_meta = true
//!
//! [auth]
//! default_scope = ["me"]
//! default_credential_type = "bearer"
//!
//! [base_uri]
//! default_scheme = "https"
//! trust_forwarded_proto = true
//! root_path = "/api"
//!
//! [telemetry]
//! service_name = "catalog"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `OUTPOST__RENDER__DEFAULT_FORMAT=hal`
//! - `OUTPOST__AUTH__DEFAULT_SCOPE=me,orders`
//! - `OUTPOST__BASE_URI__ROOT_PATH=/api`
//! - `OUTPOST__TELEMETRY__METRICS__ENABLED=false`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{OutpostConfig, OutpostConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
