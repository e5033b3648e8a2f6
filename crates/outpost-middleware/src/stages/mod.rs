//! Pipeline stages.
//!
//! The pipeline runs two stages in a fixed order:
//!
//! 1. [`dispatch`] - match a resource, authorize, invoke the action
//! 2. [`render`] - project headers, negotiate a format, render the entity
//!
//! [`authorization`] and [`error`] are used by both stages rather than being
//! stages of their own.

pub mod authorization;
pub mod dispatch;
pub mod error;
pub mod render;

pub use authorization::{Authorizer, CredentialVerifier, ExtensionVerifier};
pub use dispatch::{DispatchMiddleware, RenderableEntity};
pub use error::ErrorRenderer;
pub use render::RenderMiddleware;
