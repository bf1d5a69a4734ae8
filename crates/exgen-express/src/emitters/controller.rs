use exgen_core::config::OrmChoice;
use exgen_core::transform::ResourceName;
use exgen_core::{GeneratedFile, GeneratorError};
use minijinja::{Environment, context};

use super::render;
use crate::artifacts::ResourcePlan;

/// Emit the controller: one `exports.<method>` per planned method, with a
/// body chosen by its CRUD kind and the ORM.
pub fn emit_controller(
    env: &Environment<'_>,
    plan: &ResourcePlan,
) -> Result<GeneratedFile, GeneratorError> {
    let template = match plan.orm {
        OrmChoice::Mongoose => "mongoose.controller.js.j2",
        OrmChoice::Prisma => "prisma.controller.js.j2",
    };
    let content = render(
        env,
        template,
        context! {
            pascal => &plan.name.pascal,
            camel => &plan.name.camel,
            plural_camel => &plan.name.plural_camel,
            connection => plan.connection_literal(),
            methods => &plan.methods,
        },
    )?;
    Ok(GeneratedFile::new(plan.controller_path(), content))
}

/// A single `501 Not Implemented` handler, appended by `update:resource`.
pub fn emit_method_stub(
    env: &Environment<'_>,
    name: &ResourceName,
    method: &str,
) -> Result<String, GeneratorError> {
    render(
        env,
        "method_stub.js.j2",
        context! {
            pascal => &name.pascal,
            method => method,
        },
    )
}
