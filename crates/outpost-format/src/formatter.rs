//! The formatter contract.

use crate::error::FormatResult;
use crate::options::RenderOptions;
use bytes::Bytes;
use outpost_core::{Entity, ErrorEnvelope};

/// Turns entities and error envelopes into a wire representation.
///
/// Formatters are registered by name at startup and shared across requests,
/// so implementations must be stateless or internally synchronised.
pub trait Formatter: Send + Sync {
    /// Media types this formatter can produce, most specific first.
    ///
    /// Content negotiation matches `Accept` ranges against this list.
    fn media_types(&self) -> &[&'static str];

    /// Value of the `Content-Type` response header.
    fn content_type(&self) -> &'static str;

    /// Renders an entity graph.
    fn format_entity(&self, entity: &Entity, options: &RenderOptions) -> FormatResult<Bytes>;

    /// Renders an error envelope.
    fn format_error(&self, envelope: &ErrorEnvelope) -> FormatResult<Bytes>;
}
