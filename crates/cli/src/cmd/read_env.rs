//! Implementation of the `venvmod read-env` command.

use std::path::Path;

use anyhow::{Context, Result};

use venvmod_lib::appli::read_env_into;
use venvmod_lib::environ::process_snapshot;

use crate::output::{count, print_info, print_success, symbols};

pub fn cmd_read_env(venv: &Path, appli: Option<&str>) -> Result<()> {
  let env = process_snapshot();
  let change = read_env_into(venv, appli, &env).context("Failed to read environment variables")?;

  if change.added.is_empty() {
    print_info(&format!("No environment variables declared for {}", change.module));
    return Ok(());
  }

  print_success(&format!(
    "Added {} to {}",
    count(change.added.len(), "record"),
    change.module
  ));
  for mutation in &change.added {
    println!("  {} {}", symbols::PLUS, mutation);
  }
  Ok(())
}
