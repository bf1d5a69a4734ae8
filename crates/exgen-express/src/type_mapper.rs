use exgen_core::ir::SchemaNode;
use serde::Serialize;

/// Field type of a Mongoose schema path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentFieldType {
    String,
    Number,
    Boolean,
    ArrayOfMixed,
    Mixed,
}

impl DocumentFieldType {
    /// The JavaScript expression used as `type:` in the schema definition.
    pub fn as_mongoose(&self) -> &'static str {
        match self {
            DocumentFieldType::String => "String",
            DocumentFieldType::Number => "Number",
            DocumentFieldType::Boolean => "Boolean",
            DocumentFieldType::ArrayOfMixed => "[mongoose.Schema.Types.Mixed]",
            DocumentFieldType::Mixed => "mongoose.Schema.Types.Mixed",
        }
    }
}

/// Scalar type of a Prisma model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationalFieldType {
    String,
    DateTime,
    Int,
    Float,
    Boolean,
    Json,
}

impl RelationalFieldType {
    pub fn as_prisma(&self) -> &'static str {
        match self {
            RelationalFieldType::String => "String",
            RelationalFieldType::DateTime => "DateTime",
            RelationalFieldType::Int => "Int",
            RelationalFieldType::Float => "Float",
            RelationalFieldType::Boolean => "Boolean",
            RelationalFieldType::Json => "Json",
        }
    }
}

/// Map a schema to a Mongoose field type. Untyped schemas become `String`.
pub fn to_document_field_type(schema: &SchemaNode) -> DocumentFieldType {
    match schema {
        SchemaNode::String(_) | SchemaNode::Untyped => DocumentFieldType::String,
        SchemaNode::Integer { .. } | SchemaNode::Number { .. } => DocumentFieldType::Number,
        SchemaNode::Boolean => DocumentFieldType::Boolean,
        SchemaNode::Array { .. } => DocumentFieldType::ArrayOfMixed,
        SchemaNode::Object(_) => DocumentFieldType::Mixed,
    }
}

/// Map a schema to a Prisma scalar. Anything without a scalar equivalent is `Json`.
pub fn to_relational_field_type(schema: &SchemaNode) -> RelationalFieldType {
    match schema {
        SchemaNode::String(s) if s.format.as_deref() == Some("date-time") => {
            RelationalFieldType::DateTime
        }
        SchemaNode::String(_) => RelationalFieldType::String,
        SchemaNode::Integer { .. } => RelationalFieldType::Int,
        SchemaNode::Number { .. } => RelationalFieldType::Float,
        SchemaNode::Boolean => RelationalFieldType::Boolean,
        _ => RelationalFieldType::Json,
    }
}

/// One property of a resource schema, mapped for both persistence styles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedField {
    pub name: String,
    pub required: bool,
    /// Strings are trimmed on save (document mode only).
    pub trim: bool,
    pub document: DocumentFieldType,
    pub relational: RelationalFieldType,
    #[serde(skip)]
    pub schema: SchemaNode,
}

impl MappedField {
    pub fn new(name: impl Into<String>, schema: &SchemaNode, required: bool) -> Self {
        let document = to_document_field_type(schema);
        Self {
            name: name.into(),
            required,
            trim: document == DocumentFieldType::String,
            document,
            relational: to_relational_field_type(schema),
            schema: schema.clone(),
        }
    }

    /// Allowed values for string enums, empty otherwise.
    pub fn enum_values(&self) -> &[String] {
        match &self.schema {
            SchemaNode::String(s) => &s.enum_values,
            _ => &[],
        }
    }
}

/// Map every property of an object schema, in declaration order.
pub fn map_fields(schema: &SchemaNode) -> Vec<MappedField> {
    let Some(object) = schema.as_object() else {
        return Vec::new();
    };
    object
        .properties
        .iter()
        .map(|(name, prop)| MappedField::new(name, prop, object.is_required(name)))
        .collect()
}
