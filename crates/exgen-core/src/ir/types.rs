use indexmap::IndexMap;

use super::operations::{ApiOperation, HttpMethod};
use super::schemas::SchemaNode;

/// A fully dereferenced OpenAPI document, decoded into typed nodes.
/// Holds no `$ref` indirections.
#[derive(Debug, Clone, Default)]
pub struct SpecDocument {
    pub info: SpecInfo,
    pub schemas: IndexMap<String, SchemaNode>,
    /// Route template → HTTP method → operation, in document order.
    pub paths: IndexMap<String, IndexMap<HttpMethod, ApiOperation>>,
}

/// API metadata.
#[derive(Debug, Clone, Default)]
pub struct SpecInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

impl SpecDocument {
    /// All operations, path by path, in document order.
    pub fn operations(&self) -> impl Iterator<Item = &ApiOperation> {
        self.paths.values().flat_map(|methods| methods.values())
    }

    /// Find the component schema for a resource: exact name first, then a
    /// case-insensitive match.
    pub fn find_schema(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name).or_else(|| {
            self.schemas
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, schema)| schema)
        })
    }
}
