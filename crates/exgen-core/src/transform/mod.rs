pub mod crud;
pub mod name_normalizer;
pub mod schema_decoder;

pub use crud::{CrudKind, classify};
pub use name_normalizer::ResourceName;
