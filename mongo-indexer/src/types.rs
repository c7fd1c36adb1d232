use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Shape of the value handed to the model inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelShape {
    /// A struct-like record with named fields.
    Record,
    /// No model at all (`None`).
    Absent,
    /// A primitive such as `i32`, `bool` or `String`.
    Scalar(&'static str),
    /// A list-like value (`Vec<T>`, slices).
    Sequence,
    /// A key/value container (`HashMap`, `BTreeMap`).
    Map,
}

impl fmt::Display for ModelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => f.write_str("struct"),
            Self::Absent => f.write_str("nil"),
            Self::Scalar(name) => f.write_str(name),
            Self::Sequence => f.write_str("slice"),
            Self::Map => f.write_str("map"),
        }
    }
}

/// Per-field metadata read by the inspector.
///
/// `key` holds the raw storage-key annotation (e.g. `"email,omitempty"`) and
/// `index` the raw index mini-language string; both are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            index: None,
        }
    }

    /// Set the storage-key annotation.
    pub fn key(mut self, annotation: impl Into<String>) -> Self {
        self.key = Some(annotation.into());
        self
    }

    /// Set the index annotation.
    pub fn index(mut self, tag: impl Into<String>) -> Self {
        self.index = Some(tag.into());
        self
    }

    /// Index annotation, or `None` when the field is not indexed.
    ///
    /// An empty annotation counts as absent.
    pub fn index_tag(&self) -> Option<&str> {
        self.index.as_deref().filter(|tag| !tag.is_empty())
    }

    /// Storage key: first comma segment of the key annotation, else the
    /// lower-cased field name.
    pub fn storage_key(&self) -> String {
        match self.key.as_deref().filter(|annotation| !annotation.is_empty()) {
            Some(annotation) => annotation.split(',').next().unwrap_or_default().to_string(),
            None => self.name.to_lowercase(),
        }
    }
}

/// Descriptor of a model: its shape and, for records, the ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub shape: ModelShape,
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    /// Start describing a record-shaped model.
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: ModelShape::Record,
            fields: Vec::new(),
        }
    }

    pub fn absent() -> Self {
        Self {
            name: String::new(),
            shape: ModelShape::Absent,
            fields: Vec::new(),
        }
    }

    pub fn of_shape(name: impl Into<String>, shape: ModelShape) -> Self {
        Self {
            name: name.into(),
            shape,
            fields: Vec::new(),
        }
    }

    /// Append a field in declaration order.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push_field(&mut self, field: FieldDescriptor) -> &mut Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexDirection {
    #[default]
    Ascending,
    Descending,
}

impl IndexDirection {
    /// Key-document value used by MongoDB (`1` or `-1`).
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

impl fmt::Display for IndexDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("asc"),
            Self::Descending => f.write_str("desc"),
        }
    }
}

/// Options compiled from one index annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexOptionSet {
    pub unique: bool,
    pub direction: IndexDirection,
    pub sparse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_filter: Option<Map<String, Value>>,
}

/// A storage key paired with its index options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSpecification {
    pub key: String,
    pub options: IndexOptionSet,
}

impl IndexSpecification {
    pub fn new(key: impl Into<String>, options: IndexOptionSet) -> Self {
        Self {
            key: key.into(),
            options,
        }
    }

    pub fn direction(&self) -> IndexDirection {
        self.options.direction
    }

    /// Explicit name, or the server default `<key>_<1|-1>`.
    pub fn index_name(&self) -> String {
        match &self.options.name {
            Some(name) => name.clone(),
            None => format!("{}_{}", self.key, self.options.direction.as_i32()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_defaults_to_lowercased_name() {
        let field = FieldDescriptor::new("Email").index("unique");
        assert_eq!(field.storage_key(), "email");
    }

    #[test]
    fn storage_key_uses_first_annotation_segment() {
        let field = FieldDescriptor::new("Email").key("email,omitempty");
        assert_eq!(field.storage_key(), "email");

        let field = FieldDescriptor::new("CreatedAt").key("created_at");
        assert_eq!(field.storage_key(), "created_at");
    }

    #[test]
    fn empty_index_annotation_counts_as_absent() {
        assert_eq!(FieldDescriptor::new("ID").index("").index_tag(), None);
        assert_eq!(FieldDescriptor::new("ID").index_tag(), None);
        assert_eq!(FieldDescriptor::new("Age").index("asc").index_tag(), Some("asc"));
    }

    #[test]
    fn index_name_falls_back_to_server_default() {
        let asc = IndexSpecification::new("email", IndexOptionSet::default());
        assert_eq!(asc.index_name(), "email_1");

        let desc = IndexSpecification::new(
            "created_at",
            IndexOptionSet {
                direction: IndexDirection::Descending,
                ..Default::default()
            },
        );
        assert_eq!(desc.index_name(), "created_at_-1");

        let named = IndexSpecification::new(
            "email",
            IndexOptionSet {
                name: Some("email_idx".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(named.index_name(), "email_idx");
    }

    #[test]
    fn shape_display_names() {
        assert_eq!(ModelShape::Scalar("i32").to_string(), "i32");
        assert_eq!(ModelShape::Sequence.to_string(), "slice");
        assert_eq!(ModelShape::Record.to_string(), "struct");
    }
}
