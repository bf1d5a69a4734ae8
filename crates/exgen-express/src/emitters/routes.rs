use exgen_core::{GeneratedFile, GeneratorError};
use minijinja::{Environment, context};

use super::render;
use crate::artifacts::ResourcePlan;

/// Path of the central router that every route module is registered in.
pub const ROUTER_INDEX_PATH: &str = "src/routes/index.js";

/// Emit the resource's route table. Validator middleware is already part of
/// each method's handler chain.
pub fn emit_routes(env: &Environment<'_>, plan: &ResourcePlan) -> Result<GeneratedFile, GeneratorError> {
    let content = render(
        env,
        "routes.js.j2",
        context! {
            pascal => &plan.name.pascal,
            camel => &plan.name.camel,
            controller_var => plan.name.controller_var(),
            has_validator => plan.has_validator,
            methods => &plan.methods,
        },
    )?;
    Ok(GeneratedFile::new(plan.routes_path(), content))
}

/// Emit the central router with its registration hooks and no resources.
pub fn emit_router_index(env: &Environment<'_>) -> Result<GeneratedFile, GeneratorError> {
    let content = render(env, "router_index.js.j2", context! {})?;
    Ok(GeneratedFile::new(ROUTER_INDEX_PATH, content))
}
