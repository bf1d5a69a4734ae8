use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::Schema;

/// Components object. Only schemas feed generation; every other section is
/// reachable through `$ref` and gets inlined by the resolver.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
}
