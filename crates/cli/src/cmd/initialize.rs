//! Implementation of the `venvmod initialize` and `venvmod deinitialize` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use venvmod_lib::environ::process_snapshot;
use venvmod_lib::init::{InitOptions, deinitialize, initialize};

use crate::output::{count, print_success, symbols};

/// Execute the initialize command.
///
/// Creates the global modulefile of the environment and patches
/// `bin/activate` so activating the environment loads it.
///
/// # Errors
///
/// Returns an error if the environment is already initialized (without
/// `force`), if its activate script is not recognized, or on I/O failure.
pub fn cmd_initialize(
  venv: PathBuf,
  read_env: bool,
  activate_log: Option<String>,
  modules_init: Option<PathBuf>,
  force: bool,
) -> Result<()> {
  let options = InitOptions {
    venv_path: venv,
    read_env,
    activate_log,
    modules_init,
    force,
  };
  let env = if read_env { process_snapshot() } else { Default::default() };

  let result = initialize(&options, &env).context("Failed to initialize environment")?;

  print_success(&format!("Initialized {}", result.venv_dir.display()));
  println!("  {} Module:     {}", symbols::INFO.cyan(), result.module);
  println!("  {} Modulefile: {}", symbols::INFO.cyan(), result.module_file.display());
  println!("  {} Activate:   {}", symbols::INFO.cyan(), result.activate.display());
  if read_env {
    println!(
      "  {} Read {} from the environment",
      symbols::INFO.cyan(),
      count(result.records_read, "record")
    );
  }

  Ok(())
}

/// Execute the deinitialize command.
pub fn cmd_deinitialize(venv: &Path) -> Result<()> {
  let result = deinitialize(venv).context("Failed to deinitialize environment")?;

  print_success(&format!("Restored {}", result.activate.display()));
  for module in &result.removed_modules {
    println!("  {} {}", symbols::INFO.cyan(), module);
  }
  println!("  Removed {}", count(result.removed_modules.len(), "module"));

  Ok(())
}
