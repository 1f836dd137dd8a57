mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use venvmod_lib::module::MutationKind;

use crate::cmd::{
  cmd_add_appli, cmd_command, cmd_deinitialize, cmd_initialize, cmd_read_env, cmd_rm_appli, cmd_show, cmd_test_import,
};
use crate::output::{OutputFormat, print_error};

/// venvmod - environment modules for Python virtual environments
#[derive(Parser)]
#[command(name = "venvmod")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Target of a `cmd-*` subcommand.
#[derive(Args)]
struct CommandArgs {
  /// Application module to change (default: the global module)
  #[arg(long)]
  appli: Option<String>,

  /// Path to the virtual environment
  venv: PathBuf,

  /// Directive arguments
  #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
  args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
  /// Create the global module and hook it into bin/activate
  Initialize {
    /// Path to the virtual environment
    venv: PathBuf,

    /// Read <VENV>_* environment variables into the global module
    #[arg(long)]
    read_env: bool,

    /// Message printed when the environment is activated
    #[arg(long, value_name = "MSG")]
    activate_log: Option<String>,

    /// Module system init script sourced by bin/activate
    #[arg(long, value_name = "PATH")]
    modules_init: Option<PathBuf>,

    /// Re-patch an environment that is already initialized
    #[arg(short, long)]
    force: bool,
  },

  /// Restore bin/activate and delete all modulefiles
  Deinitialize {
    /// Path to the virtual environment
    venv: PathBuf,
  },

  /// Create application modules loaded by the global module
  AddAppli {
    /// Path to the virtual environment
    venv: PathBuf,

    /// Application names
    #[arg(required = true)]
    applis: Vec<String>,

    /// Read <APPLI>_* environment variables into each new module
    #[arg(long)]
    environ: bool,
  },

  /// Remove an application module
  RmAppli {
    /// Path to the virtual environment
    venv: PathBuf,

    /// Application name
    appli: String,
  },

  /// append-path VAR VALUE [VALUE...]
  CmdAppendPath(CommandArgs),

  /// prepend-path VAR VALUE [VALUE...]
  CmdPrependPath(CommandArgs),

  /// remove-path VAR VALUE
  CmdRemovePath(CommandArgs),

  /// setenv VAR VALUE
  CmdSetenv(CommandArgs),

  /// set-alias NAME VALUE
  CmdSetAlias(CommandArgs),

  /// module load MODULE [MODULE...]
  CmdModuleLoad(CommandArgs),

  /// module use PATH [PATH...]
  CmdModuleUse(CommandArgs),

  /// source-sh SHELL SCRIPT [ARG...]
  CmdSourceSh(CommandArgs),

  /// Append the records declared in environment variables
  ReadEnv {
    /// Application module to change (default: the global module)
    #[arg(long)]
    appli: Option<String>,

    /// Path to the virtual environment
    venv: PathBuf,
  },

  /// Show the modules of an environment
  Show {
    /// Path to the virtual environment
    venv: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Check that Python modules import
  TestImport {
    /// Interpreter to use (default: $VIRTUAL_ENV/bin/python, else python3)
    #[arg(long, value_name = "PATH")]
    python: Option<PathBuf>,

    /// Modules to import
    #[arg(required = true)]
    modules: Vec<String>,
  },
}

fn main() -> ExitCode {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) => {
      let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
      let _ = e.print();
      return code;
    }
  };

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli.command) {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn run(command: Commands) -> Result<ExitCode> {
  match command {
    Commands::Initialize {
      venv,
      read_env,
      activate_log,
      modules_init,
      force,
    } => cmd_initialize(venv, read_env, activate_log, modules_init, force)?,
    Commands::Deinitialize { venv } => cmd_deinitialize(&venv)?,
    Commands::AddAppli { venv, applis, environ } => cmd_add_appli(&venv, &applis, environ)?,
    Commands::RmAppli { venv, appli } => cmd_rm_appli(&venv, &appli)?,
    Commands::CmdAppendPath(args) => run_command(MutationKind::AppendPath, args)?,
    Commands::CmdPrependPath(args) => run_command(MutationKind::PrependPath, args)?,
    Commands::CmdRemovePath(args) => run_command(MutationKind::RemovePath, args)?,
    Commands::CmdSetenv(args) => run_command(MutationKind::Setenv, args)?,
    Commands::CmdSetAlias(args) => run_command(MutationKind::SetAlias, args)?,
    Commands::CmdModuleLoad(args) => run_command(MutationKind::ModuleLoad, args)?,
    Commands::CmdModuleUse(args) => run_command(MutationKind::ModuleUse, args)?,
    Commands::CmdSourceSh(args) => run_command(MutationKind::SourceSh, args)?,
    Commands::ReadEnv { appli, venv } => cmd_read_env(&venv, appli.as_deref())?,
    Commands::Show { venv, format } => cmd_show(&venv, format)?,
    Commands::TestImport { python, modules } => {
      if !cmd_test_import(python, &modules)? {
        return Ok(ExitCode::FAILURE);
      }
    }
  }
  Ok(ExitCode::SUCCESS)
}

fn run_command(kind: MutationKind, target: CommandArgs) -> Result<()> {
  cmd_command(&target.venv, target.appli.as_deref(), kind, target.args)
}
