use exgen_core::{GeneratedFile, GeneratorError};
use minijinja::{Environment, context};

use super::render;
use crate::artifacts::ResourcePlan;

/// Emit the express-validator rule sets (`create<Name>Rules`,
/// `update<Name>Rules`). `None` when the resource has no validator.
pub fn emit_validator(
    env: &Environment<'_>,
    plan: &ResourcePlan,
) -> Result<Option<GeneratedFile>, GeneratorError> {
    if !plan.has_validator {
        return Ok(None);
    }
    let content = render(
        env,
        "validator.js.j2",
        context! {
            pascal => &plan.name.pascal,
            fields => &plan.fields,
        },
    )?;
    Ok(Some(GeneratedFile::new(plan.validator_path(), content)))
}

#[cfg(test)]
mod tests {
    use exgen_core::config::OrmChoice;
    use exgen_core::transform::ResourceName;

    use super::*;
    use crate::emitters::environment;

    #[test]
    fn test_rule_sets() {
        let plan = ResourcePlan::crud(
            ResourceName::from_model_name("Product").unwrap(),
            OrmChoice::Mongoose,
            true,
        );
        let file = emit_validator(&environment().unwrap(), &plan).unwrap().unwrap();
        assert_eq!(file.path, "src/validators/product.validator.js");
        assert!(file.content.contains("const createProductRules = [\n  body('name').exists("));
        assert!(file.content.contains("const updateProductRules = [\n  body('name').optional()"));
        assert!(file
            .content
            .ends_with("module.exports = { createProductRules, updateProductRules };\n"));
    }

    #[test]
    fn test_skipped_without_validator() {
        let plan = ResourcePlan::crud(
            ResourceName::from_model_name("Product").unwrap(),
            OrmChoice::Mongoose,
            false,
        );
        assert!(emit_validator(&environment().unwrap(), &plan).unwrap().is_none());
    }
}
