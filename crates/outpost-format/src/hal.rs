//! The `application/hal+json` format.

use crate::error::FormatResult;
use crate::formatter::Formatter;
use crate::options::RenderOptions;
use crate::render::{EntityRenderer, LinkStyle};
use bytes::Bytes;
use outpost_core::{Entity, ErrorEnvelope};

/// Renders the same tree as [`JsonFormatter`](crate::JsonFormatter), but
/// carries the propagated query string onto every base-relative href so that
/// a client following links keeps its access token.
///
/// Absolute hrefs and templates are left without the query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalFormatter;

impl HalFormatter {
    /// Registry name of this format.
    pub const NAME: &'static str = "hal";
}

impl Formatter for HalFormatter {
    fn media_types(&self) -> &[&'static str] {
        &["application/hal+json"]
    }

    fn content_type(&self) -> &'static str {
        "application/hal+json"
    }

    fn format_entity(&self, entity: &Entity, options: &RenderOptions) -> FormatResult<Bytes> {
        let tree = EntityRenderer::new(options, LinkStyle::PropagateQuery).entity(entity);
        Ok(Bytes::from(serde_json::to_vec(&tree)?))
    }

    fn format_error(&self, envelope: &ErrorEnvelope) -> FormatResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(envelope)?))
    }
}
