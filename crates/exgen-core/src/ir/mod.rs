pub mod grouping;
pub mod operations;
pub mod schemas;
pub mod types;

pub use grouping::{Grouping, ResourceGroup, group_operations};
pub use operations::*;
pub use schemas::*;
pub use types::{SpecDocument, SpecInfo};
