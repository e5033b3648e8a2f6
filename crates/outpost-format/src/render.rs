//! The shared depth-first walk from an entity graph to a JSON tree.
//!
//! Both the plain JSON and the HAL formatter produce the same structure:
//!
//! ```json
//! {
//!   "_type": "widget",
//!   "id": 7,
//!   "_meta": { "etag": "\"v3\"" },
//!   "_embedded": { "parts": [ { "_type": "part" } ] },
//!   "_links": { "self": { "href": "https://api.example.com/widgets/7" } },
//!   "_actions": { "delete": { "method": "DELETE" } }
//! }
//! ```
//!
//! They differ only in how link hrefs are finalised, which is what
//! [`LinkStyle`] captures.

use crate::link;
use crate::options::RenderOptions;
use outpost_core::{Entity, Link, Relation, Value};
use serde_json::{Map, Value as Json};

/// How hrefs are written once resolved against the base URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// Resolve only; the propagated query string is ignored.
    Plain,
    /// Resolve and append the propagated query string to base-relative hrefs.
    PropagateQuery,
}

/// Walks an entity graph under one set of options.
#[derive(Debug)]
pub struct EntityRenderer<'a> {
    options: &'a RenderOptions,
    style: LinkStyle,
    query: Option<String>,
}

impl<'a> EntityRenderer<'a> {
    /// Creates a renderer.
    #[must_use]
    pub fn new(options: &'a RenderOptions, style: LinkStyle) -> Self {
        let query = match style {
            LinkStyle::Plain => None,
            LinkStyle::PropagateQuery => options.encoded_query(),
        };
        Self {
            options,
            style,
            query,
        }
    }

    /// Renders an entity and everything beneath it.
    #[must_use]
    pub fn entity(&self, entity: &Entity) -> Json {
        let mut obj = Map::new();

        if let Some(kind) = entity.kind() {
            obj.insert("_type".to_string(), Json::String(kind.to_string()));
        }
        for (name, value) in &entity.body {
            obj.insert(name.clone(), self.value(value));
        }

        if self.options.include_meta && entity.meta.has_rendered_fields() {
            let mut meta = Map::new();
            let fields = [
                ("etag", &entity.meta.etag),
                ("lastModified", &entity.meta.last_modified),
                ("expires", &entity.meta.expires),
            ];
            for (key, field) in fields {
                if let Some(v) = field {
                    meta.insert(key.to_string(), Json::String(v.clone()));
                }
            }
            obj.insert("_meta".to_string(), Json::Object(meta));
        }

        if self.options.include_embedded && !entity.embedded.is_empty() {
            let embedded = entity
                .embedded
                .iter()
                .map(|(rel, target)| (rel.clone(), self.relation(target, |e| self.entity(e))))
                .collect();
            obj.insert("_embedded".to_string(), Json::Object(embedded));
        }

        if self.options.include_links && !entity.links.is_empty() {
            let links = entity
                .links
                .iter()
                .map(|(rel, target)| (rel.clone(), self.relation(target, |l| self.link(l))))
                .collect();
            obj.insert("_links".to_string(), Json::Object(links));
        }

        if self.options.include_actions && !entity.actions.is_empty() {
            let actions = entity
                .actions
                .iter()
                .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
                .collect();
            obj.insert("_actions".to_string(), Json::Object(actions));
        }

        Json::Object(obj)
    }

    /// Renders a body value according to its variant.
    #[must_use]
    pub fn value(&self, value: &Value) -> Json {
        match value {
            Value::Scalar(json) => json.clone(),
            Value::Entity(entity) => self.entity(entity),
            Value::Link(link) => self.link(link),
            Value::Array(items) => Json::Array(items.iter().map(|v| self.value(v)).collect()),
        }
    }

    /// Renders a link object.
    #[must_use]
    pub fn link(&self, link: &Link) -> Json {
        let mut obj = Map::new();
        let base = self.options.base_uri.as_str();

        if !link.href.is_empty() {
            obj.insert("href".to_string(), Json::String(self.href(base, &link.href)));
        }
        if let Some(title) = link.title.as_deref().filter(|t| !t.is_empty()) {
            obj.insert("title".to_string(), Json::String(title.to_string()));
        }
        if let Some(template) = link.template.as_deref().filter(|t| !t.is_empty()) {
            obj.insert(
                "template".to_string(),
                Json::String(link::resolve_template(base, template)),
            );
        }

        Json::Object(obj)
    }

    fn href(&self, base: &str, href: &str) -> String {
        if link::is_absolute(href) {
            return href.to_string();
        }
        let resolved = link::resolve(base, href);
        match (self.style, &self.query) {
            (LinkStyle::PropagateQuery, Some(query)) => link::append_query(&resolved, query),
            _ => resolved,
        }
    }

    fn relation<T>(&self, relation: &Relation<T>, render: impl Fn(&T) -> Json) -> Json {
        match relation {
            Relation::One(item) => render(item),
            Relation::Many(items) => Json::Array(items.iter().map(render).collect()),
        }
    }
}
