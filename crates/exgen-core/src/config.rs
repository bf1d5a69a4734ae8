use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file name, written at the root of every generated project.
pub const CONFIG_FILE_NAME: &str = ".exgen.yaml";

/// Project configuration persisted at `init` and read by every later
/// `make:*` / `update:*` invocation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub app_name: String,
    pub orm: OrmChoice,
}

impl ProjectConfig {
    pub fn new(app_name: impl Into<String>, orm: OrmChoice) -> Self {
        Self {
            app_name: app_name.into(),
            orm,
        }
    }

    /// Same project, different ORM (used for the per-invocation `--orm` override).
    pub fn with_orm(&self, orm: Option<OrmChoice>) -> Self {
        Self {
            app_name: self.app_name.clone(),
            orm: orm.unwrap_or(self.orm),
        }
    }
}

/// Persistence style of the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrmChoice {
    /// Document model (Mongoose schemas).
    #[serde(alias = "document")]
    Mongoose,
    /// Relational schema (Prisma models).
    #[serde(alias = "relational")]
    Prisma,
}

impl OrmChoice {
    pub const ALL: [OrmChoice; 2] = [OrmChoice::Mongoose, OrmChoice::Prisma];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrmChoice::Mongoose => "mongoose",
            OrmChoice::Prisma => "prisma",
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, OrmChoice::Mongoose)
    }
}

impl fmt::Display for OrmChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrmChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongoose" | "document" | "mongodb" => Ok(OrmChoice::Mongoose),
            "prisma" | "relational" | "sql" => Ok(OrmChoice::Prisma),
            other => Err(format!(
                "unknown ORM `{other}` (expected `mongoose` or `prisma`)"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{} not found: not run from a project root (run `exgen init` first)", .0.display())]
    Missing(PathBuf),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load the project config from `root`. A missing file is an error: every
/// command that reads the config must run from an initialized project.
pub fn load_project_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Err(ConfigError::Missing(path));
    }
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}

/// Render the config file content.
pub fn config_content(config: &ProjectConfig) -> String {
    format!(
        "# exgen project configuration\napp_name: {}\norm: {}  # mongoose | prisma\n",
        serde_json::Value::String(config.app_name.clone()),
        config.orm
    )
}

/// Write the config file unless one already exists. Returns `true` when written.
pub fn save_project_config(root: &Path, config: &ProjectConfig) -> Result<bool, ConfigError> {
    let path = root.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, config_content(config)).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(true)
}
