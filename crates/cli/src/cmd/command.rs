//! Implementation of the `venvmod cmd-*` commands.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use venvmod_lib::appli::add_command;
use venvmod_lib::module::MutationKind;

use crate::output::print_success;

/// Append one `kind` record to the global module, or to `appli` when given.
pub fn cmd_command(venv: &Path, appli: Option<&str>, kind: MutationKind, args: Vec<String>) -> Result<()> {
  debug!(kind = %kind, args = ?args, "adding command");
  let change = add_command(venv, appli, kind.as_str(), args).with_context(|| format!("Failed to add {}", kind))?;

  for mutation in &change.added {
    print_success(&format!("{}: {}", change.module, mutation));
  }
  Ok(())
}
