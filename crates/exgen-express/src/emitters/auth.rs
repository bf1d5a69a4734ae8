use exgen_core::config::OrmChoice;
use exgen_core::{GeneratedFile, GeneratorError};
use minijinja::{Environment, context};

use super::render;
use crate::artifacts::{FieldPlan, ResourcePlan};

/// Name of the model the authentication set owns.
pub const USER_MODEL: &str = "User";

/// Fields the authentication flow declares on `User` itself.
const AUTH_USER_FIELDS: [&str; 6] = ["name", "email", "password", "isVerified", "otp", "otpExpires"];

/// Path of the authentication `User` model for `orm`.
pub fn user_model_path(orm: OrmChoice) -> &'static str {
    match orm {
        OrmChoice::Mongoose => "src/models/user.model.js",
        OrmChoice::Prisma => "prisma/schema/user.prisma",
    }
}

/// Emit the fixed authentication set: register / verify-otp / login / me,
/// JWT and OTP helpers, and a `User` model for the chosen ORM.
///
/// When the API also describes a `User` resource, its fields are added to
/// that model and `password` becomes optional, so records created through
/// the resource routes validate against the same model.
pub fn emit_auth(
    env: &Environment<'_>,
    orm: OrmChoice,
    user_resource: Option<&ResourcePlan>,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let ctx = context! { orm => orm.as_str() };
    let extra_fields: Vec<&FieldPlan> = user_resource
        .map(|plan| {
            plan.fields
                .iter()
                .filter(|f| !AUTH_USER_FIELDS.contains(&f.field.name.as_str()))
                .collect()
        })
        .unwrap_or_default();
    let model_ctx = context! {
        extended => user_resource.is_some(),
        fields => extra_fields,
    };
    let template = match orm {
        OrmChoice::Mongoose => "user.model.js.j2",
        OrmChoice::Prisma => "user.prisma.j2",
    };

    Ok(vec![
        GeneratedFile::new(user_model_path(orm), render(env, template, model_ctx)?),
        GeneratedFile::new(
            "src/controllers/auth.controller.js",
            render(env, "auth.controller.js.j2", ctx.clone())?,
        ),
        GeneratedFile::new(
            "src/routes/auth.routes.js",
            include_str!("../../templates/auth.routes.js"),
        ),
        GeneratedFile::new(
            "src/validators/auth.validator.js",
            include_str!("../../templates/auth.validator.js"),
        ),
        GeneratedFile::new(
            "src/middlewares/auth.middleware.js",
            render(env, "auth.middleware.js.j2", ctx)?,
        ),
        GeneratedFile::new("src/utils/jwt.js", include_str!("../../templates/jwt.js")),
        GeneratedFile::new("src/utils/otp.js", include_str!("../../templates/otp.js")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;
    use exgen_core::ir::{ObjectSchema, ResourceGroup, SchemaNode, StringSchema};
    use exgen_core::transform::ResourceName;
    use indexmap::IndexMap;

    fn user_plan(orm: OrmChoice) -> ResourcePlan {
        let object = ObjectSchema::new(
            IndexMap::from([
                ("email".to_string(), SchemaNode::string()),
                ("age".to_string(), SchemaNode::Integer { format: None }),
                (
                    "role".to_string(),
                    SchemaNode::String(StringSchema {
                        format: None,
                        enum_values: vec!["admin".to_string(), "member".to_string()],
                    }),
                ),
            ]),
            ["email"],
        );
        let group = ResourceGroup {
            name: ResourceName::from_group_key("users").unwrap(),
            operations: Vec::new(),
        };
        ResourcePlan::from_group(&group, Some(&SchemaNode::Object(object)), orm, &mut Vec::new())
    }

    #[test]
    fn test_mongoose_auth() {
        let files = emit_auth(&environment().unwrap(), OrmChoice::Mongoose, None).unwrap();
        assert_eq!(files[0].path, "src/models/user.model.js");
        assert!(files[0].content.contains("    password: { type: String, required: true },\n"));
        let controller = &files[1].content;
        assert!(controller.contains("const User = require('../models/user.model');"));
        assert!(controller.contains("User.findOne({ email })"));
        assert!(!controller.contains("prisma"));
    }

    #[test]
    fn test_prisma_auth() {
        let files = emit_auth(&environment().unwrap(), OrmChoice::Prisma, None).unwrap();
        assert_eq!(files[0].path, "prisma/schema/user.prisma");
        assert!(files[0].content.contains("\n  password   String\n"));
        let middleware = &files.iter().find(|f| f.path.ends_with("auth.middleware.js")).unwrap().content;
        assert!(middleware.contains("prisma.user.findUnique({"));
        assert!(!middleware.contains("User.findById"));
    }

    #[test]
    fn test_user_resource_extends_mongoose_model() {
        let plan = user_plan(OrmChoice::Mongoose);
        let files = emit_auth(&environment().unwrap(), OrmChoice::Mongoose, Some(&plan)).unwrap();
        let model = &files[0].content;
        assert!(model.contains("    age: { type: Number },\n"));
        assert!(model.contains("    role: { type: String, trim: true, enum: ['admin', 'member'] },\n"));
        assert!(model.contains("    password: { type: String },\n"));
        assert_eq!(model.matches("    email: ").count(), 1);
    }

    #[test]
    fn test_user_resource_extends_prisma_model() {
        let plan = user_plan(OrmChoice::Prisma);
        let files = emit_auth(&environment().unwrap(), OrmChoice::Prisma, Some(&plan)).unwrap();
        let model = &files[0].content;
        assert!(model.contains("\n  age Int?\n"));
        assert!(model.contains("\n  role String?\n"));
        assert!(model.contains("\n  password   String?\n"));
        assert_eq!(model.matches("email").count(), 1);
    }
}
