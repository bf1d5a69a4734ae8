use std::path::PathBuf;

use thiserror::Error;

/// Anything that stops an OpenAPI document from loading. Always fatal: the
/// run aborts before a single file is written.
#[derive(Debug, Error)]
pub enum SpecParseError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("failed to load referenced document {location}: {reason}")]
    External { location: String, reason: String },
}

/// A user-supplied name that cannot become an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name `{0}` contains no alphanumeric characters")]
    Empty(String),

    #[error("`{0}` is not in `Resource.method` form")]
    InvalidMethodTarget(String),
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("template error: {0}")]
    Template(String),

    #[error("{artifact} does not reference resource `{expected}`")]
    NamingMismatch { artifact: String, expected: String },

    #[error("generation failed: {0}")]
    Other(String),
}
