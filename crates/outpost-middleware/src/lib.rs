//! # Outpost Middleware
//!
//! The dispatch-and-render pipeline for Outpost hypermedia APIs.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → Dispatch ──(not handled)──────────────→ Render → host fallback
//!              │
//!              ├─ authorize → invoke → entity ───→ Render → Response
//!              └─ failure ─────────────────────────────────→ error Response
//! ```
//!
//! | Stage | Middleware | Purpose |
//! |-------|------------|---------|
//! | 1 | Dispatch | Match a resource, build the auth context, invoke the action |
//! | 2 | Render | Project headers, negotiate a format, render the entity |
//!
//! Errors from either stage are rendered by the same negotiated formatter as
//! entities, through [`stages::ErrorRenderer`].
//!
//! ## Example
//!
//! ```
//! use outpost_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages[0].name(), "dispatch");
//! assert_eq!(stages[1].name(), "render");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod abort;
pub mod base_uri;
pub mod context;
pub mod input;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use abort::{AbortHandle, AbortSignal};
pub use base_uri::BaseUriResolver;
pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use stages::{
    Authorizer, CredentialVerifier, DispatchMiddleware, ErrorRenderer, ExtensionVerifier,
    RenderMiddleware, RenderableEntity,
};
pub use types::{Request, Response, ResponseExt, VARY_ON};
