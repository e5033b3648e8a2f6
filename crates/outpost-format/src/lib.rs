//! # Outpost Format
//!
//! Renders Outpost entity graphs into wire representations and picks the
//! representation for a request.
//!
//! - [`EntityRenderer`] - The shared recursive walk (`_type`, `_meta`,
//!   `_embedded`, `_links`, `_actions`)
//! - [`JsonFormatter`] (`application/json`) and [`HalFormatter`]
//!   (`application/hal+json`)
//! - [`Formatter`] - The contract for additional formats
//! - [`FormatterRegistry`] - Name to formatter map with `Accept` negotiation
//! - [`RenderOptions`] - Base URI, section toggles and query overrides
//!
//! # Example
//!
//! ```
//! use outpost_core::{Entity, Link};
//! use outpost_format::{FormatterRegistry, HalFormatter, RenderOptions};
//!
//! let registry = FormatterRegistry::new().register("hal", HalFormatter);
//! let chosen = registry.negotiate(Some("application/json"));
//!
//! let entity = Entity::typed("widget")
//!     .with_property("id", 1)
//!     .with_link("self", Link::new("/widgets/1"));
//! let body = chosen
//!     .formatter
//!     .format_entity(&entity, &RenderOptions::new("https://api.example.com"))
//!     .unwrap();
//!
//! let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
//! assert_eq!(json["_type"], "widget");
//! assert_eq!(json["_links"]["self"]["href"], "https://api.example.com/widgets/1");
//! ```

#![doc(html_root_url = "https://docs.rs/outpost-format/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod formatter;
mod hal;
mod json;
pub mod link;
pub mod negotiate;
mod options;
mod registry;
pub mod render;

pub use error::{FormatError, FormatResult};
pub use formatter::Formatter;
pub use hal::HalFormatter;
pub use json::JsonFormatter;
pub use options::{flag_enabled, RenderOptions};
pub use registry::{FormatterRegistry, Negotiated};
pub use render::{EntityRenderer, LinkStyle};
