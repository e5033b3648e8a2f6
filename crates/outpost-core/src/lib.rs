//! # Outpost Core
//!
//! Core types and contracts for the Outpost hypermedia pipeline.
//!
//! - [`Entity`] - The hypermedia object graph an action returns
//! - [`RequestContext`] - Per-invocation context (status, auth, params)
//! - [`AuthContext`], [`Scope`], [`AuthRequirement`], [`VerifiedCredential`] - Authorization types
//! - [`Action`], [`Resource`], [`Service`] - Dispatch contracts
//! - [`OutpostError`] - Standard error type and its wire envelope

#![doc(html_root_url = "https://docs.rs/outpost-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod context;
pub mod entity;
mod error;
mod resource;

pub use auth::{AuthContext, AuthRequirement, Scope, VerifiedCredential};
pub use context::{RequestContext, RequestId, RequestParams};
pub use entity::{Entity, Link, Meta, Relation, Value};
pub use error::{ErrorCategory, ErrorEnvelope, OutpostError, OutpostResult};
pub use resource::{Action, BoxFuture, FnAction, Resource, RouteResource, Service, ServiceDef};
