use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use exgen_core::config::{ConfigError, OrmChoice, ProjectConfig, load_project_config};
use exgen_core::error::{NameError, SpecParseError};
use exgen_core::ir::SpecDocument;
use exgen_core::output::{WriteReport, WriteResult, write_all_if_absent};
use exgen_core::parse;
use exgen_core::transform::ResourceName;
use exgen_core::transform::name_normalizer::{parse_method_target, route_segment};
use exgen_core::{GeneratedFile, GeneratorError};
use thiserror::Error;

use crate::artifacts::{ResourcePlan, controller_path, routes_path};
use crate::emitters::{self, controller, model, routes};
use crate::generator::{ExpressGenerator, emit_resource};
use crate::registrar::{self, IMPORT_HOOK, RegisterError, Registration};

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("{} not found: not run from a project root (run `exgen init` first)", .0.display())]
    MissingConfig(PathBuf),

    #[error(transparent)]
    Config(ConfigError),

    #[error("{} does not exist", .0.display())]
    MissingArtifact(PathBuf),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Spec(#[from] SpecParseError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Name(#[from] NameError),
}

impl From<ConfigError> for ScaffoldError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing(path) => ScaffoldError::MissingConfig(path),
            other => ScaffoldError::Config(other),
        }
    }
}

impl From<(PathBuf, io::Error)> for ScaffoldError {
    fn from((path, source): (PathBuf, io::Error)) -> Self {
        ScaffoldError::Io { path, source }
    }
}

/// Result of `init`.
#[derive(Debug, Default)]
pub struct InitReport {
    pub writes: WriteReport,
    pub resources: Vec<ResourcePlan>,
    pub warnings: Vec<String>,
}

/// Which `make:*` artifact to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeKind {
    Controller,
    Model,
    Route,
    Resource,
}

/// Per-invocation overrides for `make:*`.
#[derive(Debug, Clone, Default)]
pub struct MakeOptions {
    pub orm: Option<OrmChoice>,
    pub connection: Option<String>,
}

/// Result of `make:*`. Rejected names never stop the other names.
#[derive(Debug, Default)]
pub struct MakeReport {
    pub writes: WriteReport,
    pub registrations: Vec<(String, Result<(), RegisterError>)>,
    pub rejected: Vec<NameError>,
}

/// Result of `update:resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Appended { controller: PathBuf, routes: PathBuf },
    AlreadyPresent { method: String },
}

/// Scaffold a blank authenticated project at `root`.
pub fn init_project(root: &Path, config: &ProjectConfig) -> Result<InitReport, ScaffoldError> {
    init_with_spec(root, config, &SpecDocument::default())
}

/// Scaffold a project from an OpenAPI document (file path or URL). The
/// document is loaded and every file rendered before anything is written.
pub fn init_from_openapi(
    root: &Path,
    config: &ProjectConfig,
    source: &str,
) -> Result<InitReport, ScaffoldError> {
    let spec = parse::load_source(source)?;
    init_with_spec(root, config, &spec)
}

/// Scaffold a project from an already loaded document.
pub fn init_with_spec(
    root: &Path,
    config: &ProjectConfig,
    spec: &SpecDocument,
) -> Result<InitReport, ScaffoldError> {
    let output = ExpressGenerator.generate_project(spec, config)?;
    log::info!(
        "generating {} files for `{}` into {}",
        output.files.len(),
        config.app_name,
        root.display()
    );
    let writes = write_all_if_absent(root, &output.files)?;
    let mut warnings = output.warnings;

    // A router from an earlier run was kept; thread the resources into it
    let router = root.join(routes::ROUTER_INDEX_PATH);
    let router_kept = writes
        .entries
        .iter()
        .any(|(path, result)| *path == router && *result == WriteResult::Skipped);
    if router_kept {
        for plan in &output.resources {
            if let Err(err) = register_in_router(root, plan)? {
                warnings.push(err.to_string());
            }
        }
    }

    Ok(InitReport {
        writes,
        resources: output.resources,
        warnings,
    })
}

/// `make:<kind>` for each of `names`, inside the project at `root`.
pub fn make_artifacts(
    root: &Path,
    kind: MakeKind,
    names: &[String],
    options: &MakeOptions,
) -> Result<MakeReport, ScaffoldError> {
    let config = load_project_config(root)?.with_orm(options.orm);
    let env = emitters::environment()?;
    let mut report = MakeReport::default();

    for raw in names {
        let name = match ResourceName::from_model_name(raw) {
            Ok(name) => name,
            Err(err) => {
                log::warn!("skipping `{raw}`: {err}");
                report.rejected.push(err);
                continue;
            }
        };
        let plan = ResourcePlan::crud(name, config.orm, kind == MakeKind::Resource)
            .with_connection(options.connection.clone());

        let files: Vec<GeneratedFile> = match kind {
            MakeKind::Model => vec![model::emit_model(&env, &plan)?],
            MakeKind::Controller => vec![controller::emit_controller(&env, &plan)?],
            MakeKind::Route => vec![routes::emit_routes(&env, &plan)?],
            MakeKind::Resource => emit_resource(&env, &plan)?.into_files(),
        };
        report.writes.extend(write_all_if_absent(root, &files)?);

        if matches!(kind, MakeKind::Route | MakeKind::Resource) {
            let outcome = register_in_router(root, &plan)?;
            report.registrations.push((plan.name.pascal.clone(), outcome));
        }
    }

    Ok(report)
}

/// Register a resource's route module in `src/routes/index.js` on disk. The
/// inner result carries the non-fatal registration outcome.
pub fn register_in_router(
    root: &Path,
    plan: &ResourcePlan,
) -> Result<Result<(), RegisterError>, ScaffoldError> {
    let path = root.join(routes::ROUTER_INDEX_PATH);
    if !path.exists() {
        let registration = Registration::new(&plan.name, &plan.route_module(), &plan.mount);
        return Ok(Err(RegisterError::HookMissing {
            hook: IMPORT_HOOK,
            instructions: registration.instructions(),
        }));
    }
    let source = read(&path)?;
    match registrar::register(&plan.name, &plan.route_module(), &plan.mount, &source) {
        Ok(updated) => {
            write(&path, &updated)?;
            log::debug!("registered {} in {}", plan.name.pascal, path.display());
            Ok(Ok(()))
        }
        Err(err) => Ok(Err(err)),
    }
}

/// `update:resource <Name.method>`: append a stub handler to the controller
/// and a stub route to the route file.
pub fn update_resource(root: &Path, target: &str) -> Result<UpdateOutcome, ScaffoldError> {
    load_project_config(root)?;
    let (name, method) = parse_method_target(target)?;

    let controller_file = root.join(controller_path(&name));
    let routes_file = root.join(routes_path(&name));
    for path in [&controller_file, &routes_file] {
        if !path.exists() {
            return Err(ScaffoldError::MissingArtifact(path.clone()));
        }
    }

    let controller_src = read(&controller_file)?;
    if controller_src.contains(&format!("exports.{method} =")) {
        return Ok(UpdateOutcome::AlreadyPresent { method });
    }

    let env = emitters::environment()?;
    let mut updated = controller_src;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&controller::emit_method_stub(&env, &name, &method)?);

    let routes_src = read(&routes_file)?;
    let route_line = format!(
        "router.get('{}/{}', {}.{method});",
        route_prefix(&routes_src),
        route_segment(&method),
        name.controller_var()
    );
    let routes_updated = if routes_src.lines().any(|l| l.trim() == route_line) {
        routes_src
    } else {
        insert_route(&routes_src, &route_line)
    };

    write(&controller_file, &updated)?;
    write(&routes_file, &routes_updated)?;
    Ok(UpdateOutcome::Appended {
        controller: controller_file,
        routes: routes_file,
    })
}

/// Literal leading segments shared by every route in a route file:
/// `/products` for files generated from an API document (full paths, mounted
/// at `/`), empty for `make:route` files whose paths are relative.
fn route_prefix(source: &str) -> String {
    let mut common: Option<Vec<&str>> = None;
    for line in source.lines() {
        let line = line.trim_start();
        if !line.starts_with("router.") || line.starts_with("router.use(") {
            continue;
        }
        let Some(path) = line.split('\'').nth(1) else {
            continue;
        };
        let literal: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .take_while(|s| !s.starts_with(':'))
            .collect();
        common = Some(match common {
            None => literal,
            Some(prev) => prev
                .into_iter()
                .zip(literal)
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }
    common
        .unwrap_or_default()
        .iter()
        .map(|segment| format!("/{segment}"))
        .collect()
}

/// Insert a route line after the last route, above `module.exports = router;`
/// and any blank lines before it. Appended at the end when there is no export.
fn insert_route(source: &str, line: &str) -> String {
    let mut lines: Vec<&str> = source.lines().collect();
    let at = match lines
        .iter()
        .rposition(|l| l.trim() == "module.exports = router;")
    {
        Some(mut i) => {
            while i > 0 && lines[i - 1].trim().is_empty() {
                i -= 1;
            }
            i
        }
        None => lines.len(),
    };
    lines.insert(at, line);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn read(path: &Path) -> Result<String, ScaffoldError> {
    fs::read_to_string(path).map_err(|source| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), ScaffoldError> {
    fs::write(path, content).map_err(|source| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    })
}
