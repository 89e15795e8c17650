mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use flowbuild_lib::bundle::Mode;

use crate::cmd::{Project, cmd_check, cmd_imports, cmd_reconcile};
use crate::output::{OutputFormat, print_error};

/// flowbuild - frontend build orchestration for server-side web applications
#[derive(Parser)]
#[command(name = "flowbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project directory
  #[arg(short, long, global = true, default_value = ".")]
  project: PathBuf,

  /// Options file (default: <project>/flowbuild.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value = "text")]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Reconcile package.json with the packages the application declares
  Reconcile {
    /// Scanner output (JSON)
    #[arg(long)]
    scan: PathBuf,

    /// Platform versions.json (overrides the options file)
    #[arg(long)]
    versions: Option<PathBuf>,
  },

  /// Check whether the frontend bundle must be rebuilt
  Check {
    /// Scanner output (JSON)
    #[arg(long)]
    scan: PathBuf,

    /// Bundle to check
    #[arg(long, value_enum, default_value = "development")]
    mode: BundleMode,

    /// Always rebuild
    #[arg(short, long)]
    force: bool,
  },

  /// Generate the frontend import files
  Imports {
    /// Scanner output (JSON)
    #[arg(long)]
    scan: PathBuf,

    /// Leave out development-only imports
    #[arg(long)]
    production: bool,
  },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BundleMode {
  Development,
  Production,
  LiveReload,
}

impl From<BundleMode> for Mode {
  fn from(mode: BundleMode) -> Self {
    match mode {
      BundleMode::Development => Mode::Development,
      BundleMode::Production => Mode::Production,
      BundleMode::LiveReload => Mode::LiveReload,
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  // RUST_LOG wins; --verbose only raises the default
  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let project = Project::load(&cli.project, cli.config.as_deref())?;

  match cli.command {
    Commands::Reconcile { scan, versions } => {
      cmd_reconcile(&project, &scan, versions.as_deref(), cli.verbose, cli.output)
    }
    Commands::Check { scan, mode, force } => cmd_check(&project, &scan, mode.into(), force, cli.output),
    Commands::Imports { scan, production } => cmd_imports(&project, &scan, production, cli.output),
  }
}
