//! The hypermedia entity model.
//!
//! An [`Entity`] is what an action returns: a typed bag of properties plus
//! hypermedia controls (links, embedded sub-entities, available actions) and
//! response metadata. Entities own their children, so an entity graph is
//! always a finite tree and any depth-first walk over it terminates.
//!
//! # Example
//!
//! ```
//! use outpost_core::{Entity, Link, Meta};
//!
//! let part = Entity::typed("part").with_property("sku", "B-17");
//!
//! let widget = Entity::typed("widget")
//!     .with_property("id", 7)
//!     .with_property("name", "sprocket")
//!     .with_meta(Meta::new().with_etag("\"v3\""))
//!     .with_link("self", Link::new("/widgets/7"))
//!     .with_embedded_many("parts", vec![part]);
//!
//! assert_eq!(widget.kind(), Some("widget"));
//! assert_eq!(widget.etag(), Some("\"v3\""));
//! ```

use indexmap::IndexMap;

/// Body property name that carries an entity tag, taking precedence over
/// [`Meta::etag`].
pub const ETAG_PROPERTY: &str = "_etag";

/// A property value inside an entity body.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Any JSON value, passed through verbatim by renderers.
    Scalar(serde_json::Value),
    /// A nested entity, rendered recursively.
    Entity(Box<Entity>),
    /// A link, resolved against the request's base URI when rendered.
    Link(Link),
    /// A list whose elements are rendered according to their own variant.
    Array(Vec<Value>),
}

impl Value {
    /// Returns the scalar string, if this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Entity> for Value {
    fn from(value: Entity) -> Self {
        Self::Entity(Box::new(value))
    }
}

impl From<Link> for Value {
    fn from(value: Link) -> Self {
        Self::Link(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

/// A relation target: a single item or a list of items.
///
/// The distinction is preserved on the wire, so a one-element list is still
/// rendered as an array.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation<T> {
    /// Exactly one target.
    One(T),
    /// Zero or more targets, rendered as an array.
    Many(Vec<T>),
}

impl<T> Relation<T> {
    /// Iterates over the targets regardless of shape.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(item) => std::slice::from_ref(item).iter(),
            Self::Many(items) => items.iter(),
        }
    }

    /// Returns true for the list shape.
    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// A hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Target reference; relative values are resolved against the base URI.
    pub href: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// URI template, always prefixed with the base URI when rendered.
    pub template: Option<String>,
}

impl Link {
    /// Creates a link to `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: None,
            template: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the URI template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// Response metadata carried alongside an entity.
///
/// Values are kept as the strings that end up in response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    /// Entity tag.
    pub etag: Option<String>,
    /// HTTP date of last modification.
    pub last_modified: Option<String>,
    /// HTTP date after which the representation is stale.
    pub expires: Option<String>,
    /// Content language tag.
    pub language: Option<String>,
    /// Location of a newly created resource.
    pub location: Option<String>,
}

impl Meta {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity tag.
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the last-modified date.
    #[must_use]
    pub fn with_last_modified(mut self, date: impl Into<String>) -> Self {
        self.last_modified = Some(date.into());
        self
    }

    /// Sets the expiry date.
    #[must_use]
    pub fn with_expires(mut self, date: impl Into<String>) -> Self {
        self.expires = Some(date.into());
        self
    }

    /// Sets the content language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns true when any of the rendered fields (etag, last-modified,
    /// expires) is present.
    #[must_use]
    pub fn has_rendered_fields(&self) -> bool {
        self.etag.is_some() || self.last_modified.is_some() || self.expires.is_some()
    }
}

/// A hypermedia entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    /// Type tag, rendered as `_type` when non-empty.
    pub kind: Option<String>,
    /// Ordered properties.
    pub body: IndexMap<String, Value>,
    /// Response metadata.
    pub meta: Meta,
    /// Link relations.
    pub links: IndexMap<String, Relation<Link>>,
    /// Embedded sub-entities by relation.
    pub embedded: IndexMap<String, Relation<Entity>>,
    /// Available actions, rendered verbatim.
    pub actions: IndexMap<String, serde_json::Value>,
}

impl Entity {
    /// Creates an untyped, empty entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty entity with a type tag.
    #[must_use]
    pub fn typed(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Returns the type tag, treating an empty string as absent.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref().filter(|k| !k.is_empty())
    }

    /// Adds or replaces a body property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Adds a single-link relation.
    #[must_use]
    pub fn with_link(mut self, rel: impl Into<String>, link: Link) -> Self {
        self.links.insert(rel.into(), Relation::One(link));
        self
    }

    /// Adds a multi-link relation.
    #[must_use]
    pub fn with_links(mut self, rel: impl Into<String>, links: Vec<Link>) -> Self {
        self.links.insert(rel.into(), Relation::Many(links));
        self
    }

    /// Embeds a single entity under `rel`.
    #[must_use]
    pub fn with_embedded(mut self, rel: impl Into<String>, entity: Entity) -> Self {
        self.embedded.insert(rel.into(), Relation::One(entity));
        self
    }

    /// Embeds a list of entities under `rel`.
    #[must_use]
    pub fn with_embedded_many(mut self, rel: impl Into<String>, entities: Vec<Entity>) -> Self {
        self.embedded.insert(rel.into(), Relation::Many(entities));
        self
    }

    /// Adds an action descriptor.
    #[must_use]
    pub fn with_action(mut self, name: impl Into<String>, descriptor: serde_json::Value) -> Self {
        self.actions.insert(name.into(), descriptor);
        self
    }

    /// Returns the entity tag: the `_etag` body property if it is a non-empty
    /// string, otherwise [`Meta::etag`].
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.body
            .get(ETAG_PROPERTY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or(self.meta.etag.as_deref())
    }
}
