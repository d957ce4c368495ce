//! Content variants accepted by cache entries
//!
//! Content is an explicit sum over the three shapes the search processors
//! dispatch on: plain text, structured JSON-like values, and snapshots of
//! application objects. Object snapshots are taken through the [`Reflective`]
//! trait, so types opt into object search by describing their fields and
//! member names explicitly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A piece of cacheable, searchable content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Content {
    /// Plain text
    Text(String),
    /// Nested mappings and sequences
    Structured(Value),
    /// Frozen view of an application object
    Object(ObjectSnapshot),
}

impl Content {
    /// Builds object content from any type implementing [`Reflective`]
    pub fn from_object<T: Reflective + ?Sized>(object: &T) -> Self {
        Content::Object(object.snapshot())
    }

    /// Whether this value is too empty to be cached
    ///
    /// Empty text and structured `null`, `false`, zero, empty-string,
    /// empty-array, and empty-mapping values are all vacant and are refused
    /// by `set_content`. Object snapshots are never vacant.
    pub fn is_vacant(&self) -> bool {
        match self {
            Content::Text(text) => text.is_empty(),
            Content::Structured(value) => match value {
                Value::Null => true,
                Value::Bool(flag) => !flag,
                Value::Number(number) => number.as_f64() == Some(0.0),
                Value::String(text) => text.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
            },
            Content::Object(_) => false,
        }
    }

    /// Variant tag as a string
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Structured(_) => "structured",
            Content::Object(_) => "object",
        }
    }

    /// Byte length for text content, `None` for the other variants
    pub fn size(&self) -> Option<usize> {
        match self {
            Content::Text(text) => Some(text.len()),
            _ => None,
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Structured(value)
    }
}

impl From<ObjectSnapshot> for Content {
    fn from(snapshot: ObjectSnapshot) -> Self {
        Content::Object(snapshot)
    }
}

/// Member names of an object, grouped by classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberSet {
    pub properties: Vec<String>,
    pub methods: Vec<String>,
    pub static_properties: Vec<String>,
    pub constants: Vec<String>,
}

impl MemberSet {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.methods.is_empty()
            && self.static_properties.is_empty()
            && self.constants.is_empty()
    }

    /// Keeps only the members whose name equals `needle`, preserving grouping
    pub fn matching(&self, needle: &str) -> MemberSet {
        let select = |names: &[String]| {
            names
                .iter()
                .filter(|name| *name == needle)
                .cloned()
                .collect()
        };

        MemberSet {
            properties: select(&self.properties),
            methods: select(&self.methods),
            static_properties: select(&self.static_properties),
            constants: select(&self.constants),
        }
    }
}

/// Serializable snapshot of an application object
///
/// Holds the directly accessible field values plus the full member listing,
/// including members contributed by ancestor types. Snapshots are frozen at
/// the moment content is assigned, which is what lets object content survive
/// a disk round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    type_name: String,
    fields: BTreeMap<String, Value>,
    members: MemberSet,
}

impl ObjectSnapshot {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
            members: MemberSet::default(),
        }
    }

    /// Records a field value; the name is also listed as a property
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        self.members.properties.push(name.clone());
        self.fields.insert(name, value.into());
        self
    }

    pub fn with_method(mut self, name: impl Into<String>) -> Self {
        self.members.methods.push(name.into());
        self
    }

    pub fn with_static_property(mut self, name: impl Into<String>) -> Self {
        self.members.static_properties.push(name.into());
        self
    }

    pub fn with_constant(mut self, name: impl Into<String>) -> Self {
        self.members.constants.push(name.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn members(&self) -> &MemberSet {
        &self.members
    }
}

/// Capability interface for object content
///
/// Types implement this to make themselves searchable by member name. The
/// default `members` listing reports the named fields as properties; types
/// with methods, statics, or constants worth finding override it.
pub trait Reflective {
    /// Name of the concrete type
    fn type_name(&self) -> &str;

    /// Directly accessible field values
    fn named_fields(&self) -> BTreeMap<String, Value>;

    /// Full member listing, including inherited members
    fn members(&self) -> MemberSet {
        MemberSet {
            properties: self.named_fields().keys().cloned().collect(),
            ..MemberSet::default()
        }
    }

    /// Freezes the object into its serializable snapshot form
    fn snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            type_name: self.type_name().to_string(),
            fields: self.named_fields(),
            members: self.members(),
        }
    }
}
