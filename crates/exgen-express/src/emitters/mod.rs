pub mod auth;
pub mod controller;
pub mod model;
pub mod routes;
pub mod scaffold;
pub mod validator;

use exgen_core::GeneratorError;
use minijinja::{AutoEscape, Environment, Value};

/// Every template rendered by the emitters, keyed by name.
const TEMPLATES: &[(&str, &str)] = &[
    ("mongoose.model.js.j2", include_str!("../../templates/mongoose.model.js.j2")),
    ("prisma.model.prisma.j2", include_str!("../../templates/prisma.model.prisma.j2")),
    ("validator.js.j2", include_str!("../../templates/validator.js.j2")),
    ("mongoose.controller.js.j2", include_str!("../../templates/mongoose.controller.js.j2")),
    ("prisma.controller.js.j2", include_str!("../../templates/prisma.controller.js.j2")),
    ("method_stub.js.j2", include_str!("../../templates/method_stub.js.j2")),
    ("routes.js.j2", include_str!("../../templates/routes.js.j2")),
    ("router_index.js.j2", include_str!("../../templates/router_index.js.j2")),
    ("app.js.j2", include_str!("../../templates/app.js.j2")),
    ("server.js.j2", include_str!("../../templates/server.js.j2")),
    ("db.js.j2", include_str!("../../templates/db.js.j2")),
    ("package.json.j2", include_str!("../../templates/package.json.j2")),
    ("env.example.j2", include_str!("../../templates/env.example.j2")),
    ("README.md.j2", include_str!("../../templates/README.md.j2")),
    ("auth.controller.js.j2", include_str!("../../templates/auth.controller.js.j2")),
    ("auth.middleware.js.j2", include_str!("../../templates/auth.middleware.js.j2")),
    ("user.model.js.j2", include_str!("../../templates/user.model.js.j2")),
    ("user.prisma.j2", include_str!("../../templates/user.prisma.j2")),
];

/// Build the template environment shared by all emitters of one run.
pub fn environment() -> Result<Environment<'static>, GeneratorError> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    // Output is JavaScript, JSON and Prisma source, never HTML
    env.set_auto_escape_callback(|_| AutoEscape::None);
    for &(name, source) in TEMPLATES {
        env.add_template(name, source).map_err(template_error)?;
    }
    Ok(env)
}

/// Render a named template.
pub fn render(env: &Environment<'_>, name: &str, ctx: Value) -> Result<String, GeneratorError> {
    env.get_template(name)
        .and_then(|tmpl| tmpl.render(ctx))
        .map_err(template_error)
}

fn template_error(err: minijinja::Error) -> GeneratorError {
    GeneratorError::Template(err.to_string())
}
