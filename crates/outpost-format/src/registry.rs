//! Formatter registry.

use crate::error::{FormatError, FormatResult};
use crate::formatter::Formatter;
use crate::json::JsonFormatter;
use crate::negotiate::{self, Candidate};
use indexmap::IndexMap;
use std::sync::Arc;

static FALLBACK: JsonFormatter = JsonFormatter;

/// The formatter chosen for one request.
#[derive(Clone, Copy)]
pub struct Negotiated<'a> {
    /// Registry name.
    pub name: &'a str,
    /// The formatter itself.
    pub formatter: &'a dyn Formatter,
}

impl std::fmt::Debug for Negotiated<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Negotiated")
            .field("name", &self.name)
            .field("content_type", &self.formatter.content_type())
            .finish()
    }
}

/// Formatters keyed by name, built at startup and shared read-only.
///
/// `json` is always registered; it can be replaced but not removed.
///
/// # Example
///
/// ```
/// use outpost_format::{FormatterRegistry, HalFormatter};
///
/// let registry = FormatterRegistry::new().register("hal", HalFormatter);
///
/// assert_eq!(registry.negotiate(Some("application/hal+json")).name, "hal");
/// assert_eq!(registry.negotiate(Some("text/html")).name, "json");
/// assert_eq!(registry.negotiate(None).name, "json");
/// ```
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: IndexMap<String, Arc<dyn Formatter>>,
    default: String,
}

impl FormatterRegistry {
    /// Creates a registry holding only `json`, which is also the default.
    #[must_use]
    pub fn new() -> Self {
        let mut formatters: IndexMap<String, Arc<dyn Formatter>> = IndexMap::new();
        formatters.insert(JsonFormatter::NAME.to_string(), Arc::new(JsonFormatter));
        Self {
            formatters,
            default: JsonFormatter::NAME.to_string(),
        }
    }

    /// Registers (or replaces) a formatter under `name`.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, formatter: impl Formatter + 'static) -> Self {
        self.formatters.insert(name.into(), Arc::new(formatter));
        self
    }

    /// Registers an already shared formatter.
    #[must_use]
    pub fn register_shared(mut self, name: impl Into<String>, formatter: Arc<dyn Formatter>) -> Self {
        self.formatters.insert(name.into(), formatter);
        self
    }

    /// Chooses which registered format wildcards and fallbacks resolve to.
    pub fn with_default(mut self, name: &str) -> FormatResult<Self> {
        if !self.formatters.contains_key(name) {
            return Err(FormatError::UnknownFormat(name.to_string()));
        }
        self.default = name.to_string();
        Ok(self)
    }

    /// Returns the default format name.
    #[must_use]
    pub fn default_name(&self) -> &str {
        &self.default
    }

    /// Returns a formatter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Formatter>> {
        self.formatters.get(name)
    }

    /// Returns the registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }

    /// Returns the number of registered formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    /// Always false; `json` cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    /// Picks the formatter for an `Accept` header value.
    #[must_use]
    pub fn negotiate(&self, accept: Option<&str>) -> Negotiated<'_> {
        let candidates: Vec<Candidate<'_>> = self
            .formatters
            .iter()
            .map(|(name, formatter)| Candidate {
                name: name.as_str(),
                media_types: formatter.media_types(),
            })
            .collect();

        let name = negotiate::select(accept, &candidates, self.default.as_str());
        tracing::debug!(format = name, accept = accept.unwrap_or(""), "negotiated format");

        match self.formatters.get_key_value(name) {
            Some((name, formatter)) => Negotiated {
                name: name.as_str(),
                formatter: formatter.as_ref(),
            },
            None => Negotiated {
                name: JsonFormatter::NAME,
                formatter: &FALLBACK,
            },
        }
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formats", &self.formatters.keys().collect::<Vec<_>>())
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;
    use crate::HalFormatter;
    use bytes::Bytes;
    use outpost_core::{Entity, ErrorEnvelope};

    struct CsvFormatter;

    impl Formatter for CsvFormatter {
        fn media_types(&self) -> &[&'static str] {
            &["text/csv"]
        }

        fn content_type(&self) -> &'static str {
            "text/csv"
        }

        fn format_entity(&self, entity: &Entity, _options: &RenderOptions) -> FormatResult<Bytes> {
            let header: Vec<&str> = entity.body.keys().map(String::as_str).collect();
            Ok(Bytes::from(header.join(",")))
        }

        fn format_error(&self, envelope: &ErrorEnvelope) -> FormatResult<Bytes> {
            Ok(Bytes::from(format!("{},{}", envelope.status, envelope.message)))
        }
    }

    #[test]
    fn test_json_always_present() {
        let registry = FormatterRegistry::new();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("json").is_some());
        assert_eq!(registry.default_name(), "json");
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_registration_order() {
        let registry = FormatterRegistry::new()
            .register("hal", HalFormatter)
            .register("csv", CsvFormatter);
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["json", "hal", "csv"]);
    }

    #[test]
    fn test_custom_formatter_negotiation() {
        let registry = FormatterRegistry::new().register("csv", CsvFormatter);
        let chosen = registry.negotiate(Some("text/csv"));

        assert_eq!(chosen.name, "csv");
        assert_eq!(chosen.formatter.content_type(), "text/csv");
    }

    #[test]
    fn test_default_must_be_registered() {
        assert!(matches!(
            FormatterRegistry::new().with_default("xml"),
            Err(FormatError::UnknownFormat(_))
        ));

        let registry = FormatterRegistry::new()
            .register("hal", HalFormatter)
            .with_default("hal")
            .unwrap();
        assert_eq!(registry.negotiate(Some("*/*")).name, "hal");
        assert_eq!(registry.negotiate(None).name, "hal");
    }

    #[test]
    fn test_json_can_be_replaced() {
        let registry = FormatterRegistry::new().register("json", CsvFormatter);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.negotiate(None).formatter.content_type(), "text/csv");
    }
}
