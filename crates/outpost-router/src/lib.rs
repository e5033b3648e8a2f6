//! URI pattern matching and verb tables for Outpost resources.
//!
//! A resource in Outpost is addressed by a URI pattern and exposes one action
//! per HTTP verb. This crate provides the two building blocks for that:
//!
//! - [`UriPattern`]: compiles `/widgets/{id}` (or `/widgets/:id`) style
//!   templates and extracts named parameters from a request path
//! - [`MethodRouter`]: maps HTTP methods to arbitrary values (actions)
//! - [`Params`]: the extracted `(name, value)` pairs
//!
//! Unlike a radix-tree router, matching here is a per-resource predicate: the
//! caller decides the order in which patterns are tried, so that the first
//! registered resource wins.
//!
//! # Example
//!
//! ```rust
//! use outpost_router::{MethodRouter, UriPattern};
//! use http::Method;
//!
//! let pattern = UriPattern::parse("/widgets/{id}").unwrap();
//! let verbs = MethodRouter::new().get("getWidget").delete("deleteWidget");
//!
//! let params = pattern.matches("/widgets/42").unwrap();
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(verbs.route(&Method::GET), Some(&"getWidget"));
//! assert!(pattern.matches("/gadgets/42").is_none());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod method_router;
mod params;
mod pattern;

pub use method_router::MethodRouter;
pub use params::Params;
pub use pattern::{PatternError, UriPattern};
