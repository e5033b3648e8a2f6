//! The canonical `application/json` format.

use crate::error::FormatResult;
use crate::formatter::Formatter;
use crate::options::RenderOptions;
use crate::render::{EntityRenderer, LinkStyle};
use bytes::Bytes;
use outpost_core::{Entity, ErrorEnvelope};

/// Renders entities as plain JSON with `_type`, `_meta`, `_embedded`,
/// `_links` and `_actions` sections.
///
/// The propagated query string in [`RenderOptions`] is ignored.
///
/// ```
/// use outpost_core::{Entity, Link};
/// use outpost_format::{Formatter, JsonFormatter, RenderOptions};
///
/// let entity = Entity::typed("widget").with_link("self", Link::new("/widgets/1"));
/// let body = JsonFormatter
///     .format_entity(&entity, &RenderOptions::new("https://api.example.com"))
///     .unwrap();
///
/// let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
/// assert_eq!(json["_links"]["self"]["href"], "https://api.example.com/widgets/1");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Registry name of this format.
    pub const NAME: &'static str = "json";
}

impl Formatter for JsonFormatter {
    fn media_types(&self) -> &[&'static str] {
        &["application/json"]
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn format_entity(&self, entity: &Entity, options: &RenderOptions) -> FormatResult<Bytes> {
        let tree = EntityRenderer::new(options, LinkStyle::Plain).entity(entity);
        Ok(Bytes::from(serde_json::to_vec(&tree)?))
    }

    fn format_error(&self, envelope: &ErrorEnvelope) -> FormatResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(envelope)?))
    }
}
