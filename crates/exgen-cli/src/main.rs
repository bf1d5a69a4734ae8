use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use exgen_core::config::{OrmChoice, ProjectConfig};
use exgen_core::ir::{SpecDocument, group_operations};
use exgen_core::output::WriteReport;
use exgen_core::parse;
use exgen_express::project::{self, InitReport, MakeReport};
use exgen_express::{ExpressGenerator, MakeKind, MakeOptions, UpdateOutcome};

#[derive(Parser)]
#[command(name = "exgen", about = "Express.js project scaffolder", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new project, optionally from an OpenAPI spec
    Init {
        /// OpenAPI spec (file path or URL). Omit for a blank project
        spec: Option<String>,

        /// Project name; the project is created in ./<name>
        #[arg(long)]
        name: Option<String>,

        /// Persistence layer (mongoose or prisma)
        #[arg(long)]
        orm: Option<OrmChoice>,

        /// Do not run `npm install`
        #[arg(long)]
        skip_install: bool,

        /// Do not start the dev server
        #[arg(long)]
        no_start: bool,
    },

    /// Generate controllers
    #[command(name = "make:controller")]
    MakeController(MakeArgs),

    /// Generate models
    #[command(name = "make:model")]
    MakeModel(MakeArgs),

    /// Generate route files and register them
    #[command(name = "make:route")]
    MakeRoute(MakeArgs),

    /// Generate model, validator, controller and routes, and register them
    #[command(name = "make:resource")]
    MakeResource(MakeArgs),

    /// Add a stub method and route to an existing resource
    #[command(name = "update:resource")]
    UpdateResource {
        /// Target in `Name.method` form, e.g. `Product.archive`
        target: String,
    },

    /// Validate an OpenAPI spec
    Validate {
        /// OpenAPI spec (file path or URL)
        spec: String,
    },

    /// Print the resources an OpenAPI spec would generate
    Inspect {
        /// OpenAPI spec (file path or URL)
        spec: String,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// Persistence layer to plan for
        #[arg(long, default_value = "mongoose")]
        orm: OrmChoice,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct MakeArgs {
    /// One or more resource names
    #[arg(required = true)]
    names: Vec<String>,

    /// Named database connection to bind to
    #[arg(long)]
    connection: Option<String>,

    /// Override the project's persistence layer for this run
    #[arg(long)]
    orm: Option<OrmChoice>,
}

impl MakeArgs {
    fn options(&self) -> MakeOptions {
        MakeOptions {
            orm: self.orm,
            connection: self.connection.clone(),
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            spec,
            name,
            orm,
            skip_install,
            no_start,
        } => cmd_init(spec, name, orm, skip_install, no_start),

        Commands::MakeController(args) => cmd_make(MakeKind::Controller, args),
        Commands::MakeModel(args) => cmd_make(MakeKind::Model, args),
        Commands::MakeRoute(args) => cmd_make(MakeKind::Route, args),
        Commands::MakeResource(args) => cmd_make(MakeKind::Resource, args),

        Commands::UpdateResource { target } => cmd_update(&target),

        Commands::Validate { spec } => cmd_validate(&spec),

        Commands::Inspect { spec, format, orm } => cmd_inspect(&spec, format, orm),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "exgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to get current directory")
}

fn print_writes(report: &WriteReport) {
    for path in report.written() {
        eprintln!("  wrote {}", path.display());
    }
    for path in report.skipped() {
        eprintln!("  skipped {} (already exists)", path.display());
    }
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("  warning: {warning}");
    }
}

/// Project name and ORM from flags, prompting for whatever is missing when
/// attached to a terminal.
fn resolve_project(name: Option<String>, orm: Option<OrmChoice>) -> Result<ProjectConfig> {
    let interactive = std::io::stdin().is_terminal();
    let name = match name {
        Some(name) => name,
        None if interactive => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Project name")
            .default("my-express-app".to_string())
            .interact_text()
            .context("failed to read project name")?,
        None => anyhow::bail!("--name is required when not running in a terminal"),
    };
    let name = name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("project name must not be empty");
    }

    let orm = match orm {
        Some(orm) => orm,
        None if interactive => {
            let choices = ["Mongoose (MongoDB)", "Prisma (SQL)"];
            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Select an ORM")
                .items(&choices)
                .default(0)
                .interact()
                .context("failed to get ORM selection")?;
            OrmChoice::ALL[selection]
        }
        None => {
            log::info!("no --orm given, defaulting to mongoose");
            OrmChoice::Mongoose
        }
    };

    Ok(ProjectConfig::new(name, orm))
}

fn cmd_init(
    spec: Option<String>,
    name: Option<String>,
    orm: Option<OrmChoice>,
    skip_install: bool,
    no_start: bool,
) -> Result<()> {
    let config = resolve_project(name, orm)?;
    let root = current_dir()?.join(&config.app_name);

    eprintln!(
        "Creating {} ({}) in {}",
        config.app_name,
        config.orm,
        root.display()
    );
    let report: InitReport = match &spec {
        Some(source) => project::init_from_openapi(&root, &config, source)
            .with_context(|| format!("failed to generate project from {source}"))?,
        None => project::init_project(&root, &config).context("failed to scaffold project")?,
    };
    print_writes(&report.writes);
    print_warnings(&report.warnings);
    for plan in &report.resources {
        eprintln!(
            "  resource {} ({} methods)",
            plan.name.pascal,
            plan.methods.len()
        );
    }

    if skip_install {
        eprintln!("\nSkipped dependency install. Run `npm install` in {}", root.display());
        return Ok(());
    }
    install_dependencies(&root)?;

    if no_start {
        eprintln!("\nDone. Start the server with `npm run dev` in {}", root.display());
        return Ok(());
    }
    start_dev_server(&root)
}

fn install_dependencies(root: &Path) -> Result<()> {
    eprintln!("Installing dependencies...");
    let installed = Command::new("npm")
        .arg("install")
        .current_dir(root)
        .status()
        .map(|status| status.success())
        .unwrap_or(false);
    if !installed {
        anyhow::bail!(
            "dependency install failed; run `npm install` manually in {}",
            root.display()
        );
    }

    match Command::new("npm")
        .args(["audit", "fix"])
        .current_dir(root)
        .output()
    {
        Ok(result) if result.status.success() => eprintln!("  npm audit fix completed"),
        Ok(_) => eprintln!("  warning: npm audit fix reported issues (non-zero exit)"),
        Err(err) => eprintln!("  warning: could not run npm audit fix: {err}"),
    }
    Ok(())
}

fn start_dev_server(root: &Path) -> Result<()> {
    eprintln!("Starting dev server...");
    let status = Command::new("npm")
        .args(["run", "dev"])
        .current_dir(root)
        .status()
        .with_context(|| format!("failed to run `npm run dev` in {}", root.display()))?;
    if !status.success() {
        anyhow::bail!("dev server exited with {status}");
    }
    Ok(())
}

fn print_make_report(report: &MakeReport) {
    for err in &report.rejected {
        eprintln!("  skipped name: {err}");
    }
    print_writes(&report.writes);
    for (name, outcome) in &report.registrations {
        match outcome {
            Ok(()) => eprintln!("  registered {name} in src/routes/index.js"),
            Err(err) => eprintln!("  note: {err}"),
        }
    }
}

fn cmd_make(kind: MakeKind, args: MakeArgs) -> Result<()> {
    let root = current_dir()?;
    let report = project::make_artifacts(&root, kind, &args.names, &args.options())?;
    print_make_report(&report);
    Ok(())
}

fn cmd_update(target: &str) -> Result<()> {
    let root = current_dir()?;
    match project::update_resource(&root, target)? {
        UpdateOutcome::Appended { controller, routes } => {
            eprintln!("  updated {}", controller.display());
            eprintln!("  updated {}", routes.display());
        }
        UpdateOutcome::AlreadyPresent { method } => {
            eprintln!("  `{method}` already exists, nothing to do");
        }
    }
    Ok(())
}

fn load_spec(source: &str) -> Result<SpecDocument> {
    parse::load_source(source).with_context(|| format!("failed to load {source}"))
}

fn cmd_validate(source: &str) -> Result<()> {
    let spec = load_spec(source)?;
    let grouping = group_operations(&spec.paths);

    eprintln!("Valid OpenAPI spec: {}", spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    eprintln!("  Operations: {}", spec.operations().count());
    eprintln!("  Schemas: {}", spec.schemas.len());
    eprintln!("  Resources: {}", grouping.groups.len());
    print_warnings(&grouping.warnings);

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(source: &str, format: InspectFormat, orm: OrmChoice) -> Result<()> {
    let spec = load_spec(source)?;
    let config = ProjectConfig::new(spec.info.title.clone(), orm);
    let output = ExpressGenerator.generate_project(&spec, &config)?;

    let summary = serde_json::json!({
        "info": {
            "title": spec.info.title,
            "version": spec.info.version,
        },
        "resources": output.resources,
        "warnings": output.warnings,
    });

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{yaml}");
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }

    Ok(())
}
