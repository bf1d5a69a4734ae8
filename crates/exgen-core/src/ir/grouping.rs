use indexmap::IndexMap;

use super::operations::{ApiOperation, HttpMethod};
use crate::transform::name_normalizer::ResourceName;

/// Operations judged to belong to one logical resource. Lives for one
/// generation run.
#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub name: ResourceName,
    pub operations: Vec<ApiOperation>,
}

/// Result of partitioning the paths of a document.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    /// Keyed by the singular resource name (`Product`), in first-seen order,
    /// so a singular tag and a plural path land in one group.
    pub groups: IndexMap<String, ResourceGroup>,
    /// Routes that could not be assigned to any resource.
    pub warnings: Vec<String>,
}

/// Partition every path into named resource groups. The first operation's
/// first tag names the resource when present; otherwise the first literal
/// path segment does. Names that agree on the singular form share a group.
/// Routes yielding no usable name are skipped with a warning.
pub fn group_operations(paths: &IndexMap<String, IndexMap<HttpMethod, ApiOperation>>) -> Grouping {
    let mut grouping = Grouping::default();

    for (template, methods) in paths {
        if methods.is_empty() {
            continue;
        }
        let tag = methods
            .values()
            .next()
            .and_then(|op| op.tags.first())
            .and_then(|tag| ResourceName::from_group_key(tag).ok());
        let name = match tag.or_else(|| path_resource_name(template)) {
            Some(name) => name,
            None => {
                let warning = format!("skipping route `{template}`: no resource name can be derived");
                log::warn!("{warning}");
                grouping.warnings.push(warning);
                continue;
            }
        };

        let group = grouping
            .groups
            .entry(name.pascal.clone())
            .or_insert_with(|| ResourceGroup {
                name: name.clone(),
                operations: Vec::new(),
            });
        // A real plural (`Products`) beats a singular tag used as its own plural
        if group.name.plural_pascal == group.name.pascal && name.plural_pascal != name.pascal {
            group.name = name;
        }
        group.operations.extend(methods.values().cloned());
    }

    grouping
}

/// Candidate name from the first literal path segment.
/// e.g. "/products/{id}" → "products", "/{id}" → none
fn path_resource_name(template: &str) -> Option<ResourceName> {
    template
        .split('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .and_then(|segment| ResourceName::from_group_key(segment).ok())
}
