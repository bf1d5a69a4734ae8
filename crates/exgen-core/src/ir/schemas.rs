use indexmap::{IndexMap, IndexSet};

/// A decoded schema, one variant per OpenAPI type. Built once at load time so
/// generators never dig through raw JSON for keys.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String(StringSchema),
    Integer { format: Option<String> },
    Number { format: Option<String> },
    Boolean,
    Array { items: Box<SchemaNode> },
    Object(ObjectSchema),
    /// No usable `type` (missing, `null`, or a `oneOf`/`anyOf` union).
    Untyped,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    pub format: Option<String>,
    pub enum_values: Vec<String>,
}

/// An object schema. `required` only ever names keys of `properties`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, SchemaNode>,
    required: IndexSet<String>,
}

impl ObjectSchema {
    /// Build an object schema, dropping `required` entries that name no property.
    pub fn new<I, S>(properties: IndexMap<String, SchemaNode>, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required = required
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| properties.contains_key(name))
            .collect();
        Self {
            properties,
            required,
        }
    }

    pub fn required(&self) -> &IndexSet<String> {
        &self.required
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.contains(field)
    }

    /// Merge another object into this one (`allOf`). Later properties win.
    pub fn merge(&mut self, other: ObjectSchema) {
        self.properties.extend(other.properties);
        self.required.extend(other.required);
    }
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::String(StringSchema::default())
    }

    pub fn string_with_format(format: &str) -> Self {
        SchemaNode::String(StringSchema {
            format: Some(format.to_string()),
            enum_values: Vec::new(),
        })
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            SchemaNode::String(s) => s.format.as_deref(),
            SchemaNode::Integer { format } | SchemaNode::Number { format } => format.as_deref(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            SchemaNode::Object(obj) => Some(obj),
            _ => None,
        }
    }
}
