use exgen_core::config::OrmChoice;
use exgen_core::{GeneratedFile, GeneratorError};
use minijinja::{Environment, context};

use super::render;
use crate::artifacts::ResourcePlan;

/// Emit the model: a Mongoose schema module or a Prisma model file.
pub fn emit_model(env: &Environment<'_>, plan: &ResourcePlan) -> Result<GeneratedFile, GeneratorError> {
    let template = match plan.orm {
        OrmChoice::Mongoose => "mongoose.model.js.j2",
        OrmChoice::Prisma => "prisma.model.prisma.j2",
    };
    let content = render(
        env,
        template,
        context! {
            pascal => &plan.name.pascal,
            camel => &plan.name.camel,
            fields => &plan.fields,
            connection => plan.connection_literal(),
        },
    )?;
    Ok(GeneratedFile::new(plan.model_path(), content))
}

#[cfg(test)]
mod tests {
    use exgen_core::transform::ResourceName;

    use super::*;
    use crate::emitters::environment;

    fn plan(orm: OrmChoice) -> ResourcePlan {
        ResourcePlan::crud(ResourceName::from_model_name("Product").unwrap(), orm, false)
    }

    #[test]
    fn test_mongoose_model() {
        let file = emit_model(&environment().unwrap(), &plan(OrmChoice::Mongoose)).unwrap();
        assert_eq!(file.path, "src/models/product.model.js");
        assert_eq!(
            file.content,
            "const mongoose = require('mongoose');\n\
             \n\
             const productSchema = new mongoose.Schema(\n  {\n    \
             name: { type: String, required: true, trim: true },\n  },\n  \
             { timestamps: true }\n);\n\
             \n\
             module.exports = mongoose.model('Product', productSchema);\n"
        );
    }

    #[test]
    fn test_mongoose_model_on_named_connection() {
        let plan = plan(OrmChoice::Mongoose).with_connection(Some("analytics".into()));
        let file = emit_model(&environment().unwrap(), &plan).unwrap();
        assert!(file.content.contains("const { getConnection } = require('../config/db');"));
        assert!(file
            .content
            .contains("module.exports = getConnection('analytics').model('Product', productSchema);"));
    }

    #[test]
    fn test_connection_name_is_escaped() {
        let plan = plan(OrmChoice::Mongoose).with_connection(Some("a'b".into()));
        let file = emit_model(&environment().unwrap(), &plan).unwrap();
        assert!(file.content.contains("getConnection('a\\'b').model('Product', productSchema);"));
    }

    #[test]
    fn test_prisma_model() {
        let file = emit_model(&environment().unwrap(), &plan(OrmChoice::Prisma)).unwrap();
        assert_eq!(file.path, "prisma/schema/product.prisma");
        assert!(file.content.starts_with("model Product {\n"));
        assert!(file.content.contains("\n  name String\n"));
        assert!(file.content.contains("@id @default(autoincrement())"));
    }
}
