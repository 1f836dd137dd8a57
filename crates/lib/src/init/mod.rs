//! Initialize and tear down a venvmod environment.
//!
//! This module provides the core logic for the `venvmod initialize` and
//! `venvmod deinitialize` commands:
//! - create the global modulefile under `etc/modulefiles`
//! - optionally fill it from `<VENV>_*` environment variables
//! - patch `bin/activate` to load it (and unload it on `deactivate`)

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::activate::{self, ActivateError, ActivationHook};
use crate::consts::APP_NAME;
use crate::environ::{self, EnvError, EnvSnapshot};
use crate::module::{DescriptorError, ModuleDescriptor};
use crate::util::fs::atomic_write;
use crate::venv::{StoreError, VirtualEnv};

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitError {
  #[error("{} is already a venvmod environment (use --force to overwrite)", path.display())]
  AlreadyInitialized { path: PathBuf },

  #[error("{} is not a venvmod environment", path.display())]
  NotInitialized { path: PathBuf },

  #[error("activate script not found: {}", path.display())]
  ActivateNotFound { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  ReadActivate { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", path.display())]
  WriteActivate { path: PathBuf, source: io::Error },

  #[error("{}: {source}", path.display())]
  Activate { path: PathBuf, source: ActivateError },

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Env(#[from] EnvError),

  #[error(transparent)]
  Descriptor(#[from] DescriptorError),
}

/// Options for initializing a virtual environment.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
  /// Path to the virtual environment
  pub venv_path: PathBuf,
  /// Read `<VENV>_*` variables into the global module
  pub read_env: bool,
  /// Message printed when the global module is loaded
  pub activate_log: Option<String>,
  /// Module system init script sourced by `activate`
  pub modules_init: Option<PathBuf>,
  /// Re-patch an already initialized environment
  pub force: bool,
}

/// Result of a successful initialization.
#[derive(Debug)]
pub struct InitResult {
  /// The virtual environment (canonicalized)
  pub venv_dir: PathBuf,
  /// Name of the global module
  pub module: String,
  /// Path to the global modulefile
  pub module_file: PathBuf,
  /// Path to the patched activate script
  pub activate: PathBuf,
  /// Records read from the environment
  pub records_read: usize,
}

fn read_activate(venv: &VirtualEnv) -> Result<(PathBuf, String), InitError> {
  let path = venv.activate_path();
  if !path.is_file() {
    return Err(InitError::ActivateNotFound { path });
  }
  let script = fs::read_to_string(&path).map_err(|source| InitError::ReadActivate {
    path: path.clone(),
    source,
  })?;
  Ok((path, script))
}

/// Initialize a virtual environment.
///
/// Everything is validated before the first write: the modulefile is written
/// first, then the activate script, each atomically.
///
/// # Errors
///
/// Returns an error if:
/// - the activate script is already patched and `force` is not set
/// - a global modulefile exists without `force`
/// - an environment variable entry is malformed
/// - the activate script lacks one of the expected lines
pub fn initialize(options: &InitOptions, env: &EnvSnapshot) -> Result<InitResult, InitError> {
  let venv = VirtualEnv::open(&options.venv_path)?;
  let (activate_path, script) = read_activate(&venv)?;

  if activate::is_patched(&script) && !options.force {
    return Err(InitError::AlreadyInitialized {
      path: venv.root().to_path_buf(),
    });
  }

  let module = venv.root_module();
  let mut root = if venv.has_root_module() {
    if !options.force {
      return Err(DescriptorError::DuplicateName(module).into());
    }
    debug!(module = %module, "keeping existing global module");
    let mut existing = venv.load_module(&module)?;
    if options.activate_log.is_some() {
      existing.load_message = options.activate_log.clone().filter(|m| !m.is_empty());
    }
    existing
  } else {
    ModuleDescriptor::new(&module, APP_NAME).with_load_message(options.activate_log.clone())
  };

  let records_read = if options.read_env {
    root.extend(environ::read_env(venv.name(), env)?)
  } else {
    0
  };

  let hook = ActivationHook {
    module_dir: venv.module_dir(),
    module: module.clone(),
    modules_init: options.modules_init.clone(),
  };
  let patched = activate::repatch(&script, &hook).map_err(|source| InitError::Activate {
    path: activate_path.clone(),
    source,
  })?;

  let module_file = venv.save_module(&root)?;
  atomic_write(&activate_path, &patched).map_err(|source| InitError::WriteActivate {
    path: activate_path.clone(),
    source,
  })?;
  info!(venv = %venv.root().display(), module = %module, "initialized environment");

  Ok(InitResult {
    venv_dir: venv.root().to_path_buf(),
    module,
    module_file,
    activate: activate_path,
    records_read,
  })
}

/// Result of tearing an environment down.
#[derive(Debug)]
pub struct DeinitResult {
  pub activate: PathBuf,
  /// Modulefiles deleted, applications first
  pub removed_modules: Vec<String>,
}

/// Restore the activate script and delete every modulefile of the tree.
pub fn deinitialize(venv_path: &std::path::Path) -> Result<DeinitResult, InitError> {
  let venv = VirtualEnv::open(venv_path)?;
  let (activate_path, script) = read_activate(&venv)?;

  let restored = activate::unpatch(&script).map_err(|source| match source {
    ActivateError::NotInitialized => InitError::NotInitialized {
      path: venv.root().to_path_buf(),
    },
    source => InitError::Activate {
      path: activate_path.clone(),
      source,
    },
  })?;

  let mut modules: Vec<String> = Vec::new();
  match venv.load_tree() {
    Ok(tree) => {
      modules.extend(tree.children().map(|c| c.name.clone()));
      modules.push(tree.root().name.clone());
    }
    Err(StoreError::NotInitialized { .. }) => {}
    Err(e) => return Err(e.into()),
  }

  atomic_write(&activate_path, &restored).map_err(|source| InitError::WriteActivate {
    path: activate_path.clone(),
    source,
  })?;

  for module in &modules {
    venv.delete_module(module)?;
  }
  if let Err(e) = fs::remove_dir(venv.module_dir()) {
    debug!(dir = %venv.module_dir().display(), error = %e, "module directory left in place");
  }
  info!(venv = %venv.root().display(), "deinitialized environment");

  Ok(DeinitResult {
    activate: activate_path,
    removed_modules: modules,
  })
}
