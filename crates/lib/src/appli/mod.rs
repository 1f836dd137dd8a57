//! Application modules and mutation commands.
//!
//! Every operation here loads the module tree of an initialized environment,
//! changes it in memory and writes back only the files it touched.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::APP_NAME;
use crate::environ::{self, EnvError, EnvSnapshot};
use crate::module::{DescriptorError, ModuleTree, Mutation};
use crate::naming;
use crate::venv::{StoreError, VirtualEnv};

#[derive(Debug, Error)]
pub enum AppliError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Env(#[from] EnvError),

  #[error(transparent)]
  Descriptor(#[from] DescriptorError),
}

/// Outcome of an operation on one module.
#[derive(Debug)]
pub struct ModuleChange {
  /// Module that was written or removed
  pub module: String,
  /// Its modulefile
  pub path: PathBuf,
  /// Records appended by the operation
  pub added: Vec<Mutation>,
}

/// Reject application names that cannot be a modulefile name.
fn check_appli(appli: &str) -> Result<(), DescriptorError> {
  if appli.contains(['/', '\\']) {
    return Err(DescriptorError::InvalidName {
      name: appli.to_string(),
      reason: "must not contain a path separator",
    });
  }
  if appli.contains('\0') {
    return Err(DescriptorError::InvalidName {
      name: appli.to_string(),
      reason: "must not contain a NUL byte",
    });
  }
  Ok(())
}

/// Create application modules and load them from the global module.
///
/// Names resolving to the same module are created once. With
/// `read_environ`, the `<APPLI>_*` variables of `env` are read into each new
/// module. Every name is validated before anything is written.
pub fn add_appli(
  venv_path: &Path,
  applis: &[String],
  read_environ: bool,
  env: &EnvSnapshot,
) -> Result<Vec<ModuleChange>, AppliError> {
  let venv = VirtualEnv::open(venv_path)?;
  let mut tree = venv.load_tree()?;

  let mut planned: Vec<(String, Vec<Mutation>)> = Vec::with_capacity(applis.len());
  for appli in applis {
    check_appli(appli)?;
    let module = venv.module_name(Some(appli));
    if planned.iter().any(|(name, _)| *name == module) {
      debug!(module = %module, "skipping duplicate application");
      continue;
    }

    let category = format!("{}-{}", APP_NAME, naming::std_name(appli));
    let added = if read_environ { environ::read_env(appli, env)? } else { Vec::new() };
    tree.create_child(&module, &category)?.extend(added.iter().cloned());
    planned.push((module, added));
  }

  let mut changes = Vec::with_capacity(planned.len());
  for (module, added) in planned {
    let child = tree.get(&module).ok_or_else(|| DescriptorError::NotFound(module.clone()))?;
    let path = venv.save_module(child)?;
    info!(module = %module, records = added.len(), "added application");
    changes.push(ModuleChange { module, path, added });
  }
  venv.save_module(tree.root())?;

  Ok(changes)
}

/// Remove an application module and its `module load` line.
pub fn rm_appli(venv_path: &Path, appli: &str) -> Result<ModuleChange, AppliError> {
  check_appli(appli)?;
  let venv = VirtualEnv::open(venv_path)?;
  let mut tree = venv.load_tree()?;
  let module = venv.module_name(Some(appli));

  tree.remove_child(&module)?;
  venv.save_module(tree.root())?;
  venv.delete_removed(&tree)?;
  info!(module = %module, "removed application");

  Ok(ModuleChange {
    path: venv.module_path(&module),
    module,
    added: Vec::new(),
  })
}

/// Append one mutation record to the global module or to `appli`.
pub fn add_command(
  venv_path: &Path,
  appli: Option<&str>,
  kind: &str,
  args: Vec<String>,
) -> Result<ModuleChange, AppliError> {
  if let Some(appli) = appli {
    check_appli(appli)?;
  }
  let venv = VirtualEnv::open(venv_path)?;
  let mut tree = venv.load_tree()?;
  let module = venv.module_name(appli);

  let descriptor = tree.get_mut(&module)?;
  let mutation = descriptor.add_mutation(kind, args)?.clone();
  let path = venv.save_module(descriptor)?;

  Ok(ModuleChange {
    module,
    path,
    added: vec![mutation],
  })
}

/// Append the records declared in `env` to the global module or to `appli`.
///
/// The variables read are those of the module's own name: `<VENV>_*` for
/// the global module, `<APPLI>_*` for an application.
pub fn read_env_into(venv_path: &Path, appli: Option<&str>, env: &EnvSnapshot) -> Result<ModuleChange, AppliError> {
  if let Some(appli) = appli {
    check_appli(appli)?;
  }
  let venv = VirtualEnv::open(venv_path)?;
  let mut tree = venv.load_tree()?;
  let module = venv.module_name(appli);
  let source = match appli {
    Some(appli) if module != venv.root_module() => appli,
    _ => venv.name(),
  };

  let descriptor = tree.get_mut(&module)?;
  let added = environ::read_env(source, env)?;
  descriptor.extend(added.iter().cloned());
  let path = venv.save_module(descriptor)?;
  info!(module = %module, records = added.len(), "read environment");

  Ok(ModuleChange { module, path, added })
}

/// Load the module tree of an initialized environment.
pub fn show(venv_path: &Path) -> Result<ModuleTree, AppliError> {
  let venv = VirtualEnv::open(venv_path)?;
  Ok(venv.load_tree()?)
}
