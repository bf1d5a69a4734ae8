use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use super::operation::{Operation, PathItem};
use super::ref_resolve::{Location, RefResolver};
use super::spec::OpenApiSpec;
use crate::error::{ResolveError, SpecParseError};
use crate::ir::{ApiOperation, HttpMethod, SpecDocument, SpecInfo};
use crate::transform::schema_decoder::decode_schema;

/// Load a local OpenAPI file and fully dereference it.
pub fn load(path: &Path) -> Result<SpecDocument, SpecParseError> {
    let content = fs::read_to_string(path).map_err(|source| SpecParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let base = Location::file(absolute(path));
    load_str(&content, is_json_path(path), &base)
}

/// Load from a file path or an http(s) URL.
pub fn load_source(source: &str) -> Result<SpecDocument, SpecParseError> {
    match Location::from_source(source) {
        Location::File(path) => load(&path),
        location @ Location::Url(_) => {
            let resolved = RefResolver::new().resolve_location(&location)?;
            decode(resolved)
        }
    }
}

/// Parse `content` (located at `base`, for relative refs), dereference it and
/// decode it into a `SpecDocument`.
pub fn load_str(content: &str, json: bool, base: &Location) -> Result<SpecDocument, SpecParseError> {
    let raw: Value = if json {
        serde_json::from_str(content)?
    } else {
        serde_yaml_ng::from_str(content)?
    };
    // Structure is checked before resolving so a non-OpenAPI file fails fast
    super::from_value(raw.clone())?;
    let resolved = RefResolver::new().resolve_document(&raw, base)?;
    decode(resolved)
}

fn decode(resolved: Value) -> Result<SpecDocument, SpecParseError> {
    let spec = super::from_value(resolved)?;
    Ok(to_document(&spec)?)
}

/// Convert the dereferenced spec into the typed document.
fn to_document(spec: &OpenApiSpec) -> Result<SpecDocument, ResolveError> {
    let mut schemas = IndexMap::new();
    if let Some(components) = &spec.components {
        for (name, schema) in &components.schemas {
            schemas.insert(name.clone(), decode_schema(schema)?);
        }
    }

    let mut paths = IndexMap::new();
    for (template, item) in &spec.paths {
        paths.insert(template.clone(), collect_operations(template, item));
    }

    log::debug!(
        "loaded `{}`: {} schemas, {} paths",
        spec.info.title,
        schemas.len(),
        paths.len()
    );

    Ok(SpecDocument {
        info: SpecInfo {
            title: spec.info.title.clone(),
            description: spec.info.description.clone(),
            version: spec.info.version.clone(),
        },
        schemas,
        paths,
    })
}

fn collect_operations(template: &str, item: &PathItem) -> IndexMap<HttpMethod, ApiOperation> {
    let mut out = IndexMap::new();

    macro_rules! add_op {
        ($method:expr, $op:expr) => {
            if let Some(ref op) = $op {
                out.insert($method, build_operation($method, template, op));
            }
        };
    }

    add_op!(HttpMethod::Get, item.get);
    add_op!(HttpMethod::Post, item.post);
    add_op!(HttpMethod::Put, item.put);
    add_op!(HttpMethod::Patch, item.patch);
    add_op!(HttpMethod::Delete, item.delete);
    add_op!(HttpMethod::Options, item.options);
    add_op!(HttpMethod::Head, item.head);
    add_op!(HttpMethod::Trace, item.trace);

    out
}

fn build_operation(method: HttpMethod, template: &str, op: &Operation) -> ApiOperation {
    ApiOperation {
        operation_id: op.operation_id.clone(),
        method,
        path: template.to_string(),
        tags: op.tags.clone(),
        summary: op.summary.clone().or_else(|| op.description.clone()),
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
