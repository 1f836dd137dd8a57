//! Import checks for Python modules.
//!
//! Each module is imported by its own interpreter process so that a crashing
//! or hanging import cannot affect the others. Processes run concurrently.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::environ::EnvSnapshot;

/// Imports the module named by `argv[1]` and prints where it came from.
const IMPORT_SCRIPT: &str = "import importlib, sys\n\
m = importlib.import_module(sys.argv[1])\n\
print(getattr(m, '__file__', None) or 'built-in')\n";

#[derive(Debug, Error)]
pub enum ImportError {
  #[error("failed to run {}: {source}", python.display())]
  Spawn { python: PathBuf, source: std::io::Error },

  #[error("import task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

/// Result of importing one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub module: String,
  /// Whether the import succeeded
  pub ok: bool,
  /// Module location on success, last line of the interpreter's stderr on failure
  pub detail: String,
}

/// Interpreter used when none is given: the active venv's python, else `python3`.
pub fn default_python(env: &EnvSnapshot) -> PathBuf {
  env
    .get("VIRTUAL_ENV")
    .map(|venv| Path::new(venv).join("bin").join("python"))
    .filter(|python| python.is_file())
    .unwrap_or_else(|| PathBuf::from("python3"))
}

async fn import_one(python: PathBuf, module: String) -> Result<ImportReport, ImportError> {
  let output = Command::new(&python)
    .arg("-c")
    .arg(IMPORT_SCRIPT)
    .arg(&module)
    .stdin(Stdio::null())
    .output()
    .await
    .map_err(|source| ImportError::Spawn {
      python: python.clone(),
      source,
    })?;

  let report = if output.status.success() {
    ImportReport {
      detail: String::from_utf8_lossy(&output.stdout).trim().to_string(),
      module,
      ok: true,
    }
  } else {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr
      .lines()
      .rev()
      .find(|line| !line.trim().is_empty())
      .map(|line| line.trim().to_string())
      .unwrap_or_else(|| format!("interpreter exited with {}", output.status));
    warn!(module = %module, detail = %detail, "import failed");
    ImportReport {
      module,
      ok: false,
      detail,
    }
  };
  Ok(report)
}

/// Import every module in its own `python` process.
///
/// Duplicate names are checked once. Reports come back in the order the
/// modules were given.
pub async fn test_imports(python: &Path, modules: &[String]) -> Result<Vec<ImportReport>, ImportError> {
  let mut unique: Vec<&String> = Vec::with_capacity(modules.len());
  for module in modules {
    if !unique.contains(&module) {
      unique.push(module);
    }
  }

  let mut tasks = JoinSet::new();
  for (index, module) in unique.iter().enumerate() {
    let python = python.to_path_buf();
    let module = (*module).clone();
    debug!(module = %module, python = %python.display(), "spawning import check");
    tasks.spawn(async move { (index, import_one(python, module).await) });
  }

  let mut reports = Vec::with_capacity(unique.len());
  while let Some(joined) = tasks.join_next().await {
    let (index, report) = joined?;
    reports.push((index, report?));
  }
  reports.sort_by_key(|(index, _)| *index);
  Ok(reports.into_iter().map(|(_, report)| report).collect())
}
