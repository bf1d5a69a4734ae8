use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::{ObjectSchema, SchemaNode, StringSchema};
use crate::parse::schema::{Schema, SchemaType};

/// Decode a dereferenced raw schema into a typed `SchemaNode`. A leftover
/// `$ref` means the resolver missed something and is reported, never skipped.
pub fn decode_schema(schema: &Schema) -> Result<SchemaNode, ResolveError> {
    if let Some(ref_path) = &schema.ref_path {
        return Err(ResolveError::RefTargetNotFound(ref_path.clone()));
    }

    // allOf merges into one object
    if !schema.all_of.is_empty() {
        let mut merged = ObjectSchema::default();
        for part in &schema.all_of {
            if let SchemaNode::Object(obj) = decode_schema(part)? {
                merged.merge(obj);
            }
        }
        if !schema.properties.is_empty() {
            merged.merge(decode_object(schema)?);
        }
        return Ok(SchemaNode::Object(merged));
    }

    if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        return Ok(SchemaNode::Untyped);
    }

    let schema_type = schema.schema_type.as_ref().and_then(|t| t.primary());
    let node = match schema_type {
        Some(SchemaType::String) => SchemaNode::String(decode_string(schema)),
        Some(SchemaType::Integer) => SchemaNode::Integer {
            format: schema.format.clone(),
        },
        Some(SchemaType::Number) => SchemaNode::Number {
            format: schema.format.clone(),
        },
        Some(SchemaType::Boolean) => SchemaNode::Boolean,
        Some(SchemaType::Array) => SchemaNode::Array {
            items: Box::new(match &schema.items {
                Some(items) => decode_schema(items)?,
                None => SchemaNode::Untyped,
            }),
        },
        Some(SchemaType::Object) => SchemaNode::Object(decode_object(schema)?),
        Some(SchemaType::Null) => SchemaNode::Untyped,
        // Untyped but shaped: infer from the keywords present
        None if !schema.properties.is_empty() => SchemaNode::Object(decode_object(schema)?),
        None if schema.items.is_some() => SchemaNode::Array {
            items: Box::new(match &schema.items {
                Some(items) => decode_schema(items)?,
                None => SchemaNode::Untyped,
            }),
        },
        None if schema.enum_values.iter().all(|v| v.is_string())
            && !schema.enum_values.is_empty() =>
        {
            SchemaNode::String(decode_string(schema))
        }
        None => SchemaNode::Untyped,
    };
    Ok(node)
}

fn decode_string(schema: &Schema) -> StringSchema {
    StringSchema {
        format: schema.format.clone(),
        enum_values: schema
            .enum_values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    }
}

fn decode_object(schema: &Schema) -> Result<ObjectSchema, ResolveError> {
    let mut properties = IndexMap::with_capacity(schema.properties.len());
    for (name, prop) in &schema.properties {
        properties.insert(name.clone(), decode_schema(prop)?);
    }
    Ok(ObjectSchema::new(properties, schema.required.iter().cloned()))
}
