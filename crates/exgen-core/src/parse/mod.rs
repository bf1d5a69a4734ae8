pub mod components;
pub mod loader;
pub mod operation;
pub mod ref_resolve;
pub mod schema;
pub mod spec;

use serde_json::Value;

use crate::error::SpecParseError;
use spec::OpenApiSpec;

pub use loader::{load, load_source, load_str};

/// Parse an OpenAPI spec from YAML (no `$ref` resolution).
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, SpecParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    from_value(value)
}

/// Parse an OpenAPI spec from JSON (no `$ref` resolution).
pub fn from_json(input: &str) -> Result<OpenApiSpec, SpecParseError> {
    let value: Value = serde_json::from_str(input)?;
    from_value(value)
}

/// Check the document's structure, then deserialize it.
pub fn from_value(mut value: Value) -> Result<OpenApiSpec, SpecParseError> {
    validate_structure(&mut value)?;
    Ok(serde_json::from_value(value)?)
}

fn validate_structure(value: &mut Value) -> Result<(), SpecParseError> {
    // `openapi: 3.1` in YAML arrives as a number
    let version = match value.get("openapi") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(SpecParseError::MissingField("openapi".to_string())),
    };
    if !version.starts_with("3.") {
        return Err(SpecParseError::UnsupportedVersion(version));
    }
    if let Some(obj) = value.as_object_mut() {
        obj.insert("openapi".to_string(), Value::String(version));
    }
    for field in ["info", "paths"] {
        if !value.get(field).is_some_and(Value::is_object) {
            return Err(SpecParseError::MissingField(field.to_string()));
        }
    }
    Ok(())
}
