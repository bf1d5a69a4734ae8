use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde_json::{Map, Value, json};
use url::Url;

use crate::error::ResolveError;

/// Where a document lives. Relative `$ref`s are joined against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Url(Url),
}

impl Location {
    /// A file location with `.` and `..` segments collapsed, so one document
    /// reached through different relative paths has one identity.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Location::File(normalize(path.as_ref()))
    }

    /// Interpret a user-supplied source (file path or http(s) URL).
    pub fn from_source(source: &str) -> Self {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Location::Url(url),
            _ => Location::file(source),
        }
    }

    /// Resolve the document part of a `$ref` against this location.
    pub fn join(&self, reference: &str) -> Result<Location, ResolveError> {
        if let Ok(url) = Url::parse(reference) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(Location::Url(url));
            }
        }
        match self {
            Location::File(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                Ok(Location::file(dir.join(reference)))
            }
            Location::Url(base) => base
                .join(reference)
                .map(Location::Url)
                .map_err(|e| ResolveError::InvalidRefFormat(format!("{reference}: {e}"))),
        }
    }

    fn is_json(&self) -> bool {
        let name = match self {
            Location::File(path) => path.to_string_lossy().into_owned(),
            Location::Url(url) => url.path().to_string(),
        };
        name.ends_with(".json")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Replaces every `$ref` in a document with the content it points at,
/// following references into other files and URLs. External documents are
/// loaded once and cached. A reference that recurses into itself is cut
/// with an empty object schema so the output never holds a `$ref`.
pub struct RefResolver {
    documents: HashMap<String, Value>,
    visited: HashSet<String>,
    client: Option<reqwest::blocking::Client>,
}

impl Default for RefResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RefResolver {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            visited: HashSet::new(),
            client: None,
        }
    }

    /// Resolve the whole root document located at `base`.
    pub fn resolve_document(&mut self, root: &Value, base: &Location) -> Result<Value, ResolveError> {
        self.documents.insert(base.to_string(), root.clone());
        self.resolve_value(root, base)
    }

    /// Load the document at `location` and resolve it.
    pub fn resolve_location(&mut self, location: &Location) -> Result<Value, ResolveError> {
        let root = self.document(location)?.clone();
        self.resolve_value(&root, location)
    }

    fn resolve_value(&mut self, value: &Value, base: &Location) -> Result<Value, ResolveError> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.resolve_ref(reference, base);
                }
                let mut resolved = Map::with_capacity(map.len());
                for (key, child) in map {
                    resolved.insert(key.clone(), self.resolve_value(child, base)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, base))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_ref(&mut self, reference: &str, base: &Location) -> Result<Value, ResolveError> {
        let (document, pointer) = split_ref(reference)?;
        let target = match document {
            "" => base.clone(),
            doc => base.join(doc)?,
        };
        let key = format!("{target}#{pointer}");
        if self.visited.contains(&key) {
            log::warn!("circular reference {reference} replaced with an empty object schema");
            return Ok(json!({ "type": "object" }));
        }

        let node = self
            .document(&target)?
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| ResolveError::RefTargetNotFound(reference.to_string()))?;

        self.visited.insert(key.clone());
        let resolved = self.resolve_value(&node, &target);
        self.visited.remove(&key);
        resolved
    }

    fn document(&mut self, location: &Location) -> Result<&Value, ResolveError> {
        let key = location.to_string();
        if !self.documents.contains_key(&key) {
            log::debug!("loading referenced document {key}");
            let text = self.fetch(location)?;
            let value = parse_document(&text, location.is_json()).map_err(|reason| {
                ResolveError::External {
                    location: key.clone(),
                    reason,
                }
            })?;
            self.documents.insert(key.clone(), value);
        }
        self.documents
            .get(&key)
            .ok_or_else(|| ResolveError::RefTargetNotFound(key))
    }

    fn fetch(&mut self, location: &Location) -> Result<String, ResolveError> {
        let external = |reason: String| ResolveError::External {
            location: location.to_string(),
            reason,
        };
        match location {
            Location::File(path) => fs::read_to_string(path).map_err(|e| external(e.to_string())),
            Location::Url(url) => {
                if self.client.is_none() {
                    let client = reqwest::blocking::Client::builder()
                        .timeout(Duration::from_secs(30))
                        .user_agent(concat!(
                            env!("CARGO_PKG_NAME"),
                            "/",
                            env!("CARGO_PKG_VERSION")
                        ))
                        .build()
                        .map_err(|e| external(e.to_string()))?;
                    self.client = Some(client);
                }
                let Some(client) = self.client.as_ref() else {
                    return Err(external("HTTP client unavailable".to_string()));
                };
                client
                    .get(url.clone())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .and_then(|r| r.text())
                    .map_err(|e| external(e.to_string()))
            }
        }
    }
}

/// Lexically collapse `.` and `..` segments. Leading `..` segments of a
/// relative path are kept; `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Parse a YAML or JSON document into a JSON value. YAML is a superset of
/// JSON, so anything not explicitly `.json` goes through the YAML parser.
pub fn parse_document(text: &str, json: bool) -> Result<Value, String> {
    if json {
        serde_json::from_str(text).map_err(|e| e.to_string())
    } else {
        serde_yaml_ng::from_str(text).map_err(|e| e.to_string())
    }
}

/// Split `other.yaml#/components/schemas/Foo` into the document part and a
/// JSON pointer. A bare document reference points at the whole document.
fn split_ref(reference: &str) -> Result<(&str, &str), ResolveError> {
    let (document, fragment) = reference.split_once('#').unwrap_or((reference, ""));
    if !fragment.is_empty() && !fragment.starts_with('/') {
        return Err(ResolveError::InvalidRefFormat(reference.to_string()));
    }
    if document.is_empty() && fragment.is_empty() {
        return Err(ResolveError::InvalidRefFormat(reference.to_string()));
    }
    Ok((document, fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Location {
        Location::File(PathBuf::from("/specs/api.yaml"))
    }

    #[test]
    fn test_split_ref() {
        assert_eq!(
            split_ref("#/components/schemas/Pet").unwrap(),
            ("", "/components/schemas/Pet")
        );
        assert_eq!(
            split_ref("pet.yaml#/Pet").unwrap(),
            ("pet.yaml", "/Pet")
        );
        assert_eq!(split_ref("pet.yaml").unwrap(), ("pet.yaml", ""));
        assert!(split_ref("#Pet").is_err());
        assert!(split_ref("#").is_err());
    }

    #[test]
    fn test_location_join() {
        assert_eq!(
            base().join("schemas/pet.yaml").unwrap(),
            Location::File(PathBuf::from("/specs/schemas/pet.yaml"))
        );
        let url = Location::Url(Url::parse("https://example.com/api/openapi.yaml").unwrap());
        assert_eq!(
            url.join("pet.yaml").unwrap(),
            Location::Url(Url::parse("https://example.com/api/pet.yaml").unwrap())
        );
        assert!(matches!(
            base().join("https://example.com/x.yaml").unwrap(),
            Location::Url(_)
        ));
    }

    #[test]
    fn test_join_collapses_parent_segments() {
        let nested = base().join("schemas/node.yaml").unwrap();
        assert_eq!(nested.join("../api.yaml").unwrap(), base());
        assert_eq!(
            nested.join("./common/../types.yaml").unwrap(),
            Location::File(PathBuf::from("/specs/schemas/types.yaml"))
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parents() {
        assert_eq!(normalize(Path::new("../a/./b/../c.yaml")), PathBuf::from("../a/c.yaml"));
        assert_eq!(normalize(Path::new("/../a.yaml")), PathBuf::from("/a.yaml"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_resolves_internal_refs() {
        let doc = json!({
            "components": {"schemas": {
                "Id": {"type": "integer"},
                "Pet": {"type": "object", "properties": {"id": {"$ref": "#/components/schemas/Id"}}}
            }},
            "paths": {"/pets": {"get": {"responses": {"200": {"content": {"application/json": {
                "schema": {"$ref": "#/components/schemas/Pet"}
            }}}}}}}
        });
        let resolved = RefResolver::new().resolve_document(&doc, &base()).unwrap();
        assert!(!resolved.to_string().contains("$ref"));
        assert_eq!(
            resolved.pointer(
                "/paths/~1pets/get/responses/200/content/application~1json/schema/properties/id/type"
            ),
            Some(&json!("integer"))
        );
    }

    #[test]
    fn test_breaks_cycles() {
        let doc = json!({"components": {"schemas": {
            "Node": {"type": "object", "properties": {
                "next": {"$ref": "#/components/schemas/Node"}
            }}
        }}});
        let resolved = RefResolver::new().resolve_document(&doc, &base()).unwrap();
        assert!(!resolved.to_string().contains("$ref"));
        assert_eq!(
            resolved.pointer("/components/schemas/Node/properties/next/properties/next"),
            Some(&json!({"type": "object"}))
        );
    }

    #[test]
    fn test_missing_target() {
        let doc = json!({"a": {"$ref": "#/components/schemas/Nope"}});
        let err = RefResolver::new().resolve_document(&doc, &base()).unwrap_err();
        assert!(matches!(err, ResolveError::RefTargetNotFound(_)));
    }

    #[test]
    fn test_missing_external_file() {
        let doc = json!({"a": {"$ref": "does-not-exist.yaml#/Foo"}});
        let err = RefResolver::new().resolve_document(&doc, &base()).unwrap_err();
        assert!(matches!(err, ResolveError::External { .. }));
    }
}
