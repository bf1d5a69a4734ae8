use std::collections::HashSet;

use exgen_core::config::{OrmChoice, ProjectConfig};
use exgen_core::ir::{ResourceGroup, SchemaNode, SpecDocument, group_operations};
use exgen_core::transform::ResourceName;
use exgen_core::{CodeGenerator, GeneratedFile, GeneratorError};
use minijinja::Environment;

use crate::artifacts::ResourcePlan;
use crate::emitters::{self, auth, controller, model, routes, scaffold, validator};
use crate::registrar::{self, RegisterError};

/// Express.js project generator.
pub struct ExpressGenerator;

/// The four coupled artifacts of one resource.
#[derive(Debug, Clone)]
pub struct ResourceArtifacts {
    pub model: GeneratedFile,
    pub validator: Option<GeneratedFile>,
    pub controller: GeneratedFile,
    pub routes: GeneratedFile,
}

impl ResourceArtifacts {
    pub fn into_files(self) -> Vec<GeneratedFile> {
        let mut files = vec![self.model];
        files.extend(self.validator);
        files.push(self.controller);
        files.push(self.routes);
        files
    }

    /// Every artifact must name the resource by its canonical spelling, and
    /// the route file must load the controller module of that resource.
    pub fn verify_naming(&self, name: &ResourceName) -> Result<(), GeneratorError> {
        let mismatch = |file: &GeneratedFile, expected: &str| GeneratorError::NamingMismatch {
            artifact: file.path.clone(),
            expected: expected.to_string(),
        };
        let files = [Some(&self.model), self.validator.as_ref(), Some(&self.controller), Some(&self.routes)];
        for file in files.into_iter().flatten() {
            if !file.content.contains(&name.pascal) {
                return Err(mismatch(file, &name.pascal));
            }
        }
        let controller_module = format!("/controllers/{}.controller'", name.camel);
        if !self.routes.content.contains(&controller_module) {
            return Err(mismatch(&self.routes, &name.camel));
        }
        Ok(())
    }
}

/// Everything one OpenAPI-driven (or blank) project generation produces.
#[derive(Debug, Clone, Default)]
pub struct ProjectOutput {
    pub files: Vec<GeneratedFile>,
    pub resources: Vec<ResourcePlan>,
    /// Skipped routes, placeholder models and collisions, in order.
    pub warnings: Vec<String>,
}

/// Render the artifacts of a planned resource and check their naming.
pub fn emit_resource(
    env: &Environment<'_>,
    plan: &ResourcePlan,
) -> Result<ResourceArtifacts, GeneratorError> {
    let artifacts = ResourceArtifacts {
        model: model::emit_model(env, plan)?,
        validator: validator::emit_validator(env, plan)?,
        controller: controller::emit_controller(env, plan)?,
        routes: routes::emit_routes(env, plan)?,
    };
    artifacts.verify_naming(&plan.name)?;
    Ok(artifacts)
}

/// Plan and render one resource group. A missing schema adds a warning.
pub fn emit(
    env: &Environment<'_>,
    group: &ResourceGroup,
    orm: OrmChoice,
    schema: Option<&SchemaNode>,
    warnings: &mut Vec<String>,
) -> Result<(ResourcePlan, ResourceArtifacts), GeneratorError> {
    let plan = ResourcePlan::from_group(group, schema, orm, warnings);
    let artifacts = emit_resource(env, &plan)?;
    Ok((plan, artifacts))
}

/// Component schema for a group: singular name, plural name, then the raw
/// group name.
fn schema_for<'a>(spec: &'a SpecDocument, name: &ResourceName) -> Option<&'a SchemaNode> {
    spec.find_schema(&name.pascal)
        .or_else(|| spec.find_schema(&name.plural_pascal))
        .or_else(|| spec.find_schema(&name.original))
}

impl ExpressGenerator {
    /// Generate the whole project in memory: skeleton, auth set, then one
    /// resource per group of `spec`, registered on the central router.
    /// Nothing is written here, so a failure leaves the disk untouched.
    pub fn generate_project(
        &self,
        spec: &SpecDocument,
        config: &ProjectConfig,
    ) -> Result<ProjectOutput, GeneratorError> {
        let env = emitters::environment()?;
        let mut output = ProjectOutput {
            files: scaffold::emit_scaffold(&env, config)?,
            ..ProjectOutput::default()
        };

        let grouping = group_operations(&spec.paths);
        output.warnings.extend(grouping.warnings);

        let mut planned = Vec::with_capacity(grouping.groups.len());
        for group in grouping.groups.values() {
            let schema = schema_for(spec, &group.name);
            planned.push(emit(&env, group, config.orm, schema, &mut output.warnings)?);
        }

        // A `User` resource extends the authentication model
        let user_resource = planned
            .iter()
            .map(|(plan, _)| plan)
            .find(|plan| plan.name.pascal == auth::USER_MODEL);
        output
            .files
            .extend(auth::emit_auth(&env, config.orm, user_resource)?);
        let user_model = auth::user_model_path(config.orm);

        let mut taken: HashSet<String> = output.files.iter().map(|f| f.path.clone()).collect();
        for (plan, artifacts) in planned {
            for file in artifacts.into_files() {
                if taken.insert(file.path.clone()) {
                    output.files.push(file);
                    continue;
                }
                let warning = if plan.name.pascal == auth::USER_MODEL && file.path == user_model {
                    format!(
                        "resource `{}` shares the authentication model; its fields were added to {}",
                        plan.name.pascal, file.path
                    )
                } else {
                    format!("resource `{}` reuses existing {}", plan.name.pascal, file.path)
                };
                log::warn!("{warning}");
                output.warnings.push(warning);
            }
            log::debug!(
                "planned resource {} ({} methods, validator: {})",
                plan.name.pascal,
                plan.methods.len(),
                plan.has_validator
            );
            output.resources.push(plan);
        }

        register_all(&mut output)?;
        Ok(output)
    }
}

/// Register every planned resource on the in-memory central router.
fn register_all(output: &mut ProjectOutput) -> Result<(), GeneratorError> {
    let Some(index) = output
        .files
        .iter_mut()
        .find(|f| f.path == routes::ROUTER_INDEX_PATH)
    else {
        return Err(GeneratorError::Other(format!(
            "{} missing from the scaffold",
            routes::ROUTER_INDEX_PATH
        )));
    };
    for plan in &output.resources {
        match registrar::register(&plan.name, &plan.route_module(), &plan.mount, &index.content) {
            Ok(updated) => index.content = updated,
            Err(err @ RegisterError::AlreadyRegistered(_)) => {
                log::warn!("{err}");
                output.warnings.push(err.to_string());
            }
            Err(err) => return Err(GeneratorError::Other(err.to_string())),
        }
    }
    Ok(())
}

impl CodeGenerator for ExpressGenerator {
    type Config = ProjectConfig;

    fn generate(
        &self,
        spec: &SpecDocument,
        config: &ProjectConfig,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        Ok(self.generate_project(spec, config)?.files)
    }
}
