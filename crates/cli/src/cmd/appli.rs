//! Implementation of the `venvmod add-appli` and `venvmod rm-appli` commands.

use std::path::Path;

use anyhow::{Context, Result};

use venvmod_lib::appli::{add_appli, rm_appli};
use venvmod_lib::environ::process_snapshot;

use crate::output::{count, print_stat, print_success};

pub fn cmd_add_appli(venv: &Path, applis: &[String], environ: bool) -> Result<()> {
  let env = if environ { process_snapshot() } else { Default::default() };
  let changes = add_appli(venv, applis, environ, &env)
    .with_context(|| format!("Failed to add {}", count(applis.len(), "application")))?;

  for change in &changes {
    print_success(&format!("Added application module {}", change.module));
    print_stat("Modulefile", &change.path.display().to_string());
    if environ {
      print_stat("Environment", &count(change.added.len(), "record"));
    }
  }
  Ok(())
}

pub fn cmd_rm_appli(venv: &Path, appli: &str) -> Result<()> {
  let change = rm_appli(venv, appli).with_context(|| format!("Failed to remove application '{}'", appli))?;
  print_success(&format!("Removed application module {}", change.module));
  Ok(())
}
