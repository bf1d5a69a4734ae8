pub mod artifacts;
pub mod emitters;
pub mod generator;
pub mod project;
pub mod registrar;
pub mod type_mapper;

pub use artifacts::ResourcePlan;
pub use generator::{ExpressGenerator, ProjectOutput, ResourceArtifacts};
pub use project::{MakeKind, MakeOptions, ScaffoldError, UpdateOutcome};
