use std::fmt;

use serde::Serialize;

use crate::ir::{HttpMethod, path_params};

/// The canonical role of an operation within its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudKind {
    List,
    Create,
    Retrieve,
    Replace,
    Delete,
    Custom,
}

impl CrudKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrudKind::List => "list",
            CrudKind::Create => "create",
            CrudKind::Retrieve => "retrieve",
            CrudKind::Replace => "replace",
            CrudKind::Delete => "delete",
            CrudKind::Custom => "custom",
        }
    }

    /// Whether a request body validator guards this kind of route.
    pub fn takes_validated_body(&self) -> bool {
        matches!(self, CrudKind::Create | CrudKind::Replace)
    }
}

impl fmt::Display for CrudKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a naming rule inspects the operationId.
#[derive(Debug, Clone, Copy)]
enum Match {
    /// Starts with one of the words (case-insensitive).
    Prefix(&'static [&'static str]),
    /// Starts with one of the words and ends with one of the suffixes.
    PrefixAndSuffix(&'static [&'static str], &'static [&'static str]),
    /// Contains one of the words anywhere (case-insensitive).
    Anywhere(&'static [&'static str]),
}

/// One entry of the ordered naming table.
#[derive(Debug, Clone, Copy)]
pub struct NamingRule {
    kind: CrudKind,
    matcher: Match,
}

impl NamingRule {
    pub fn kind(&self) -> CrudKind {
        self.kind
    }

    pub fn matches(&self, operation_id: &str) -> bool {
        let lower = operation_id.to_ascii_lowercase();
        match self.matcher {
            Match::Prefix(words) => words.iter().any(|w| lower.starts_with(w)),
            Match::PrefixAndSuffix(words, suffixes) => {
                words.iter().any(|w| lower.starts_with(w))
                    && suffixes.iter().any(|s| operation_id.ends_with(s))
            }
            Match::Anywhere(words) => words.iter().any(|w| lower.contains(w)),
        }
    }
}

/// Naming rules in priority order; the first match wins. Explicit names beat
/// the structural fallback, so `updateWidget` on `GET /widgets/{id}` is a
/// `Replace`.
pub const NAMING_RULES: [NamingRule; 5] = [
    NamingRule {
        kind: CrudKind::Create,
        matcher: Match::Prefix(&["create", "add", "store"]),
    },
    NamingRule {
        kind: CrudKind::Replace,
        matcher: Match::Prefix(&["update", "patch", "edit"]),
    },
    NamingRule {
        kind: CrudKind::Delete,
        matcher: Match::Prefix(&["delete", "remove", "destroy"]),
    },
    NamingRule {
        kind: CrudKind::Retrieve,
        matcher: Match::PrefixAndSuffix(&["get", "find", "show", "retrieve"], &["ById", "One"]),
    },
    NamingRule {
        kind: CrudKind::List,
        matcher: Match::Anywhere(&["list", "get", "find", "index", "search"]),
    },
];

/// Structural fallback on `(method, has path parameter)`.
pub fn classify_by_shape(method: HttpMethod, has_path_param: bool) -> CrudKind {
    match (method, has_path_param) {
        (HttpMethod::Get, false) => CrudKind::List,
        (HttpMethod::Post, false) => CrudKind::Create,
        (HttpMethod::Get, true) => CrudKind::Retrieve,
        (HttpMethod::Put | HttpMethod::Patch, _) => CrudKind::Replace,
        (HttpMethod::Delete, _) => CrudKind::Delete,
        _ => CrudKind::Custom,
    }
}

/// Infer the CRUD kind of an operation. Total: every input yields one kind.
/// Operations without an operationId are never guessed at.
pub fn classify(operation_id: Option<&str>, method: HttpMethod, route_template: &str) -> CrudKind {
    let Some(id) = operation_id.filter(|id| !id.trim().is_empty()) else {
        return CrudKind::Custom;
    };
    if let Some(rule) = NAMING_RULES.iter().find(|rule| rule.matches(id)) {
        return rule.kind();
    }
    classify_by_shape(method, !path_params(route_template).is_empty())
}
