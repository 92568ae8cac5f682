//! ansible-creator CLI - scaffolding for Ansible collections, playbooks and plugins

mod logging;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::Colorize;
use creator_core::templates::{Action, CollisionFlags};
use creator_core::{
    execute, registry, Execution, Output, PluginType, Request, ResourceKind, Status,
    TemplateStore, UserParams,
};
use logging::{LogLevel, LogOptions};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LOG_FILE: &str = "ansible-creator.log";

#[derive(Parser, Debug)]
#[command(name = "ansible-creator")]
#[command(about = "The fastest way to generate all your ansible content.")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(ClapArgs, Debug)]
pub struct CommonArgs {
    /// Give more CLI output; repeat for more detail
    #[arg(short = 'v', long = "verbosity", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable the use of ANSI codes for terminal color
    #[arg(long = "no-ansi", visible_alias = "na", global = true)]
    pub no_ansi: bool,

    /// Output the result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log file to write to
    #[arg(long = "log-file", visible_alias = "lf", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log level for file output
    #[arg(long = "log-level", visible_alias = "ll", value_enum, default_value = "notset", global = true)]
    pub log_level: LogLevel,

    /// Append to the log file instead of truncating it
    #[arg(
        long = "log-append",
        visible_alias = "la",
        default_value_t = true,
        action = clap::ArgAction::Set,
        global = true
    )]
    pub log_append: bool,

    /// Local directory to use for templates instead of the bundled ones (for development use)
    #[arg(long = "template-dir", global = true)]
    pub template_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new Ansible project
    #[command(subcommand)]
    Init(InitCommand),
    /// Add resources to an existing Ansible project
    #[command(subcommand)]
    Add(AddCommand),
    /// Print the command schema as JSON
    Schema(SchemaArgs),
}

#[derive(Subcommand, Debug)]
pub enum InitCommand {
    /// Create a new Ansible collection project
    Collection(ProjectArgs),
    /// Create a new Ansible playbook project
    Playbook(ProjectArgs),
    /// Create a new execution environment project
    #[command(name = "execution_env")]
    ExecutionEnv(ExecutionEnvArgs),
}

#[derive(Subcommand, Debug)]
pub enum AddCommand {
    /// Add resources to an existing Ansible project
    #[command(subcommand)]
    Resource(ResourceCommand),
    /// Add a plugin to an existing Ansible collection
    #[command(subcommand)]
    Plugin(PluginCommand),
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// Add devcontainer files to an existing Ansible project
    Devcontainer(DevcontainerArgs),
    /// Add a devfile to an existing Ansible project
    Devfile(PathArgs),
    /// Add a sample execution-environment.yml file to an existing path
    #[command(name = "execution-environment")]
    ExecutionEnvironment(PathArgs),
    /// Add a role to an existing Ansible collection
    Role(RoleArgs),
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// Add an action plugin to an existing collection
    Action(PluginArgs),
    /// Add a filter plugin to an existing collection
    Filter(PluginArgs),
    /// Add a lookup plugin to an existing collection
    Lookup(PluginArgs),
    /// Add a generic module to an existing collection
    Module(PluginArgs),
    /// Add a test plugin to an existing collection
    Test(PluginArgs),
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct OverwriteArgs {
    /// Overwrite existing files or directories
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Flag that restricts overwriting operation
    #[arg(long = "no-overwrite", visible_alias = "no_overwrite")]
    pub no_overwrite: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ProjectArgs {
    /// The collection name in the format '<namespace>.<collection>'
    pub collection: String,

    /// The path in which the project will be created
    #[arg(default_value = "./")]
    pub init_path: PathBuf,

    /// Force re-initialize the specified directory (deprecated, use --overwrite)
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,
}

#[derive(ClapArgs, Debug)]
pub struct ExecutionEnvArgs {
    /// The path in which the project will be created
    #[arg(default_value = "./")]
    pub init_path: PathBuf,

    /// Force re-initialize the specified directory (deprecated, use --overwrite)
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,
}

#[derive(ClapArgs, Debug)]
pub struct PathArgs {
    /// The path to the target directory
    #[arg(default_value = "./")]
    pub path: PathBuf,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,
}

#[derive(ClapArgs, Debug)]
pub struct DevcontainerArgs {
    /// The path to the target directory
    #[arg(default_value = "./")]
    pub path: PathBuf,

    /// Image for the devcontainer: 'auto', 'upstream', 'aap' or a full image reference
    #[arg(short, long, default_value = "auto")]
    pub image: String,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,
}

#[derive(ClapArgs, Debug)]
pub struct RoleArgs {
    /// The name of the role
    pub role_name: String,

    /// The path to the collection root
    #[arg(default_value = "./")]
    pub path: PathBuf,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,
}

#[derive(ClapArgs, Debug)]
pub struct PluginArgs {
    /// The name of the plugin
    pub plugin_name: String,

    /// The path to the collection root
    #[arg(default_value = "./")]
    pub path: PathBuf,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,
}

#[derive(ClapArgs, Debug)]
pub struct SchemaArgs {
    /// Command path to describe, e.g. `add plugin`
    pub segments: Vec<String>,
}

impl OverwriteArgs {
    fn flags(self, force: bool) -> CollisionFlags {
        CollisionFlags {
            force,
            overwrite: self.overwrite,
            no_overwrite: self.no_overwrite,
        }
    }
}

type RequestParts = (ResourceKind, UserParams, PathBuf, CollisionFlags);

fn project(kind: ResourceKind, args: ProjectArgs) -> RequestParts {
    (
        kind,
        UserParams {
            collection: Some(args.collection),
            ..Default::default()
        },
        args.init_path,
        args.overwrite.flags(args.force),
    )
}

/// Turn parsed arguments into a library request
fn build_request(command: Command) -> Option<Request> {
    let (kind, params, path, flags) = match command {
        Command::Schema(_) => return None,
        Command::Init(init) => match init {
            InitCommand::Collection(args) => project(ResourceKind::Collection, args),
            InitCommand::Playbook(args) => project(ResourceKind::Playbook, args),
            InitCommand::ExecutionEnv(args) => (
                ResourceKind::ExecutionEnvProject,
                UserParams::default(),
                args.init_path,
                args.overwrite.flags(args.force),
            ),
        },
        Command::Add(AddCommand::Resource(resource)) => match resource {
            ResourceCommand::Devcontainer(args) => (
                ResourceKind::Devcontainer,
                UserParams {
                    image: Some(args.image),
                    ..Default::default()
                },
                args.path,
                args.overwrite.flags(false),
            ),
            ResourceCommand::Devfile(args) => (
                ResourceKind::Devfile,
                UserParams::default(),
                args.path,
                args.overwrite.flags(false),
            ),
            ResourceCommand::ExecutionEnvironment(args) => (
                ResourceKind::ExecutionEnvironment,
                UserParams::default(),
                args.path,
                args.overwrite.flags(false),
            ),
            ResourceCommand::Role(args) => (
                ResourceKind::Role,
                UserParams {
                    role_name: Some(args.role_name),
                    ..Default::default()
                },
                args.path,
                args.overwrite.flags(false),
            ),
        },
        Command::Add(AddCommand::Plugin(plugin)) => {
            let (plugin_type, args) = match plugin {
                PluginCommand::Action(args) => (PluginType::Action, args),
                PluginCommand::Filter(args) => (PluginType::Filter, args),
                PluginCommand::Lookup(args) => (PluginType::Lookup, args),
                PluginCommand::Module(args) => (PluginType::Module, args),
                PluginCommand::Test(args) => (PluginType::Test, args),
            };
            (
                ResourceKind::Plugin(plugin_type),
                UserParams {
                    plugin_name: Some(args.plugin_name),
                    ..Default::default()
                },
                args.path,
                args.overwrite.flags(false),
            )
        }
    };
    Some(Request::new(kind, params, path).with_flags(flags))
}

/// Make a relative path absolute against the working directory
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(cwd.join(path))
}

fn exit_code(status: Status) -> ExitCode {
    match status {
        Status::Completed => ExitCode::SUCCESS,
        Status::Failed => ExitCode::from(1),
        Status::Rejected => ExitCode::from(2),
    }
}

fn print_json(execution: &Execution, output: &Output) -> Result<()> {
    let message = match &execution.result {
        Ok(()) => output.last_note().unwrap_or_default().to_string(),
        Err(e) => e.to_string(),
    };
    let doc = json!({
        "status": execution.status(),
        "path": execution.destination,
        "summary": execution.summary(),
        "records": execution.records,
        "logs": output.messages(),
        "message": message,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// One line per action taken, in the order it happened
fn print_records(execution: &Execution, color: bool) {
    for record in &execution.records {
        let label = format!("{:>17}", record.action.to_string());
        let label = if !color {
            label
        } else {
            match record.action {
                Action::Created | Action::DirectoryCreated => label.green().to_string(),
                Action::Overwritten => label.yellow().to_string(),
                Action::Skipped => label.dimmed().to_string(),
            }
        };
        println!("{} {}", label, record.path.display());
    }
}

fn print_summary(execution: &Execution, color: bool) {
    print_records(execution, color);
    let summary = execution.summary().to_string();
    match execution.status() {
        Status::Completed if color => println!("{} {}", "Done:".green().bold(), summary),
        Status::Completed => println!("Done: {}", summary),
        _ if color => eprintln!("{} {}", "Stopped after:".yellow().bold(), summary),
        _ => eprintln!("Stopped after: {}", summary),
    }
}

fn run_schema(args: &SchemaArgs) -> Result<ExitCode> {
    let segments: Vec<&str> = args.segments.iter().map(String::as_str).collect();
    match registry::schema_for(&segments) {
        Ok(schema) => {
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            Ok(ExitCode::from(1))
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let common = args.common;
    let color = !common.no_ansi && !common.json && std::env::var_os("NO_COLOR").is_none();
    colored::control::set_override(color);

    let log_file = match &common.log_file {
        Some(path) => absolute(path)?,
        None => absolute(Path::new(DEFAULT_LOG_FILE))?,
    };
    logging::init(&LogOptions {
        verbosity: common.verbose,
        file: log_file,
        level: common.log_level,
        append: common.log_append,
        ansi: color,
    })?;
    tracing::debug!(version = CLI_VERSION, "starting ansible-creator");

    if let Command::Schema(schema_args) = &args.command {
        return run_schema(schema_args);
    }

    let store = match &common.template_dir {
        Some(dir) => TemplateStore::local(absolute(dir)?),
        None => TemplateStore::embedded(),
    };

    let Some(mut request) = build_request(args.command) else {
        return Ok(ExitCode::SUCCESS);
    };
    request.path = absolute(&request.path)?;

    let mut output = if common.json {
        Output::capture(common.verbose)
    } else {
        Output::terminal(common.verbose, color)
    };
    let execution = execute(&store, &request, &mut output);

    if common.json {
        print_json(&execution, &output)?;
    } else {
        print_summary(&execution, color);
    }

    Ok(exit_code(execution.status()))
}
