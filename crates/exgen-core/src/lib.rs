pub mod config;
pub mod error;
pub mod ir;
pub mod output;
pub mod parse;
pub mod transform;

pub use error::GeneratorError;

/// A generated file with path (relative to the project root) and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Trait for code generators that produce files from a loaded spec.
pub trait CodeGenerator {
    type Config;
    fn generate(
        &self,
        spec: &ir::SpecDocument,
        config: &Self::Config,
    ) -> Result<Vec<GeneratedFile>, GeneratorError>;
}
