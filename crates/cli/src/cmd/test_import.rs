//! Implementation of the `venvmod test-import` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use venvmod_lib::environ::process_snapshot;
use venvmod_lib::imports::{default_python, test_imports};

use crate::output::{count, print_warning, symbols};

/// Import each module with `python`; returns whether all of them imported.
pub fn cmd_test_import(python: Option<PathBuf>, modules: &[String]) -> Result<bool> {
  let python = python.unwrap_or_else(|| default_python(&process_snapshot()));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let reports = rt
    .block_on(test_imports(&python, modules))
    .context("Import check failed")?;

  let mut failed = 0;
  for report in &reports {
    if report.ok {
      println!(
        "{} {} {}",
        symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
        report.module,
        report.detail.if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    } else {
      failed += 1;
      println!(
        "{} {} {}",
        symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
        report.module,
        report.detail
      );
    }
  }

  if failed > 0 {
    print_warning(&format!(
      "{} of {} failed to import",
      failed,
      count(reports.len(), "module")
    ));
  }
  Ok(failed == 0)
}
