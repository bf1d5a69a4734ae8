use exgen_core::config::{CONFIG_FILE_NAME, ProjectConfig, config_content};
use exgen_core::{GeneratedFile, GeneratorError};
use heck::ToKebabCase;
use minijinja::{Environment, context};

use super::render;
use super::routes::emit_router_index;

/// Emit the static project skeleton: package manifest, app entry points,
/// database wiring, shared middleware and the central router.
pub fn emit_scaffold(
    env: &Environment<'_>,
    config: &ProjectConfig,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let package_name = package_name(&config.app_name);
    let ctx = context! {
        app_name => &config.app_name,
        package_name => &package_name,
        orm => config.orm.as_str(),
    };

    let mut files = vec![
        GeneratedFile::new(CONFIG_FILE_NAME, config_content(config)),
        GeneratedFile::new("package.json", render(env, "package.json.j2", ctx.clone())?),
        GeneratedFile::new(".env.example", render(env, "env.example.j2", ctx.clone())?),
        GeneratedFile::new(".gitignore", include_str!("../../templates/gitignore")),
        GeneratedFile::new("README.md", render(env, "README.md.j2", ctx.clone())?),
        GeneratedFile::new(
            "postman_collection.json",
            include_str!("../../templates/postman_collection.json"),
        ),
        GeneratedFile::new("src/app.js", render(env, "app.js.j2", ctx.clone())?),
        GeneratedFile::new("src/server.js", render(env, "server.js.j2", ctx.clone())?),
        GeneratedFile::new("src/config/db.js", render(env, "db.js.j2", ctx)?),
        GeneratedFile::new(
            "src/middlewares/validate.middleware.js",
            include_str!("../../templates/validate.middleware.js"),
        ),
        GeneratedFile::new(
            "src/middlewares/error.middleware.js",
            include_str!("../../templates/error.middleware.js"),
        ),
        emit_router_index(env)?,
    ];

    if !config.orm.is_document() {
        files.push(GeneratedFile::new(
            "prisma/schema/schema.prisma",
            include_str!("../../templates/schema.prisma"),
        ));
    }

    Ok(files)
}

/// npm package name for an app name: `My Shop` → `my-shop`.
fn package_name(app_name: &str) -> String {
    let name = app_name.to_kebab_case();
    if name.is_empty() { "app".to_string() } else { name }
}

#[cfg(test)]
mod tests {
    use exgen_core::config::OrmChoice;

    use super::*;
    use crate::emitters::environment;

    fn paths(files: &[GeneratedFile]) -> Vec<&str> {
        files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_mongoose_scaffold() {
        let config = ProjectConfig::new("My Shop", OrmChoice::Mongoose);
        let files = emit_scaffold(&environment().unwrap(), &config).unwrap();
        let paths = paths(&files);
        assert!(paths.contains(&".exgen.yaml"));
        assert!(paths.contains(&"src/routes/index.js"));
        assert!(!paths.contains(&"prisma/schema/schema.prisma"));

        let package = &files.iter().find(|f| f.path == "package.json").unwrap().content;
        let json: serde_json::Value = serde_json::from_str(package).unwrap();
        assert_eq!(json["name"], "my-shop");
        assert!(json["dependencies"]["mongoose"].is_string());
        assert!(json["dependencies"].get("@prisma/client").is_none());
        assert_eq!(json["scripts"]["dev"], "nodemon src/server.js");

        let db = &files.iter().find(|f| f.path == "src/config/db.js").unwrap().content;
        assert!(db.contains("module.exports = { connectDB, getConnection };"));
    }

    #[test]
    fn test_prisma_scaffold() {
        let config = ProjectConfig::new("shop", OrmChoice::Prisma);
        let files = emit_scaffold(&environment().unwrap(), &config).unwrap();
        assert!(paths(&files).contains(&"prisma/schema/schema.prisma"));

        let package = &files.iter().find(|f| f.path == "package.json").unwrap().content;
        let json: serde_json::Value = serde_json::from_str(package).unwrap();
        assert!(json["dependencies"]["@prisma/client"].is_string());
        assert!(json["devDependencies"]["prisma"].is_string());
        assert_eq!(json["prisma"]["schema"], "prisma/schema");

        let env = &files.iter().find(|f| f.path == ".env.example").unwrap().content;
        assert!(env.contains("DATABASE_URL=postgresql://"));
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("My Shop"), "my-shop");
        assert_eq!(package_name("shopApi"), "shop-api");
        assert_eq!(package_name("!!"), "app");
    }
}
