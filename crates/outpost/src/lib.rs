//! # Outpost
//!
//! **A hypermedia dispatch-and-render pipeline**
//!
//! Outpost sits inside an HTTP host. For each request it finds the resource
//! and action that handle it, builds the caller's authorization context,
//! invokes the action, and renders the returned entity graph in the format
//! the client negotiated, with links resolved against the request's own base
//! URI. Requests no resource claims go back to the host.
//!
//! ## Quick Start
//!
//! ```
//! use outpost::prelude::*;
//! use bytes::Bytes;
//! use http_body_util::Full;
//!
//! # tokio_test::block_on(async {
//! let greetings = ServiceDef::new("greetings").resource(
//!     RouteResource::new("greeting", "/hello/{name}")
//!         .unwrap()
//!         .get(FnAction::new(|ctx: &RequestContext| {
//!             let name = ctx.params().get("name").unwrap_or("world").to_string();
//!             Box::pin(async move {
//!                 Ok(Entity::typed("greeting")
//!                     .with_property("to", name.clone())
//!                     .with_link("self", Link::new(format!("/hello/{name}"))))
//!             })
//!         })),
//! );
//!
//! let app = Outpost::builder()
//!     .service(greetings)
//!     .formatter("hal", HalFormatter)
//!     .build()
//!     .unwrap();
//!
//! let request = http::Request::builder()
//!     .uri("/hello/ada")
//!     .header("host", "api.example.com")
//!     .body(Full::new(Bytes::new()))
//!     .unwrap();
//!
//! let response = app
//!     .handle(request, |_req| async { Response::empty(http::StatusCode::NOT_FOUND) })
//!     .await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Dispatch (match → authorize → invoke) → Render (headers → negotiate → format)
//!              └── not handled ─────────────────────────────────────→ host fallback
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;

pub use app::{BuildError, Outpost, OutpostBuilder, REQUEST_ID_HEADER};

pub use outpost_config as config;
pub use outpost_core as core;
pub use outpost_format as format;
pub use outpost_middleware as middleware;
pub use outpost_router as router;
pub use outpost_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```
/// use outpost::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{BuildError, Outpost, OutpostBuilder};

    pub use outpost_core::{
        Action, AuthContext, AuthRequirement, Entity, FnAction, Link, Meta, OutpostError,
        OutpostResult, Relation, RequestContext, RequestId, Resource, RouteResource, Scope,
        Service, ServiceDef, Value, VerifiedCredential,
    };

    pub use outpost_format::{Formatter, FormatterRegistry, HalFormatter, JsonFormatter, RenderOptions};

    pub use outpost_middleware::{
        AbortHandle, AbortSignal, CredentialVerifier, ExtensionVerifier, Request, Response,
        ResponseExt,
    };

    pub use outpost_config::{ConfigLoader, OutpostConfig};
}
