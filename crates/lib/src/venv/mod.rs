//! Virtual environment layout and modulefile storage.
//!
//! # Storage Layout
//!
//! ```text
//! <venv>/
//! ├── bin/activate             # patched by `activate`
//! └── etc/modulefiles/
//!     ├── <venv>               # global module (tree root)
//!     └── <venv>-<appli>       # one file per application module
//! ```
//!
//! Every command reads the files it needs, mutates them in memory and writes
//! them back with [`atomic_write`]. There is no locking: invocations against
//! the same environment must be serialized by the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::MODULEFILES_DIR;
use crate::module::{self, DescriptorError, ModuleDescriptor, ModuleTree, ParseError};
use crate::naming;
use crate::util::fs::atomic_write;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("virtual environment '{}' does not exist", path.display())]
  NotADirectory { path: PathBuf },

  #[error("{} is not a venvmod environment, run 'venvmod initialize' first", path.display())]
  NotInitialized { path: PathBuf },

  #[error("modulefile for '{name}' not found: {}", path.display())]
  MissingModule { name: String, path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to remove {}: {source}", path.display())]
  Remove { path: PathBuf, source: io::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: ParseError },

  #[error("{} declares module '{found}', expected '{expected}'", path.display())]
  NameMismatch {
    path: PathBuf,
    expected: String,
    found: String,
  },

  #[error(transparent)]
  Tree(#[from] DescriptorError),
}

/// A virtual environment directory and the paths derived from it.
#[derive(Debug, Clone)]
pub struct VirtualEnv {
  root: PathBuf,
  name: String,
}

impl VirtualEnv {
  /// Open an existing virtual environment directory.
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if !path.is_dir() {
      return Err(StoreError::NotADirectory { path: path.to_path_buf() });
    }
    let root = dunce::canonicalize(path).map_err(|source| StoreError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let name = root
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .ok_or_else(|| StoreError::NotADirectory { path: root.clone() })?;
    Ok(Self { root, name })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Directory name of the environment, as given by the user.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn activate_path(&self) -> PathBuf {
    self.root.join("bin").join("activate")
  }

  pub fn module_dir(&self) -> PathBuf {
    self.root.join(MODULEFILES_DIR)
  }

  /// Name of the global module.
  pub fn root_module(&self) -> String {
    naming::std_name(&self.name)
  }

  /// Module name for `appli`, or the global module when `None`.
  pub fn module_name(&self, appli: Option<&str>) -> String {
    naming::module_name(&self.name, appli)
  }

  pub fn module_path(&self, module: &str) -> PathBuf {
    self.module_dir().join(module)
  }

  /// Whether the global modulefile exists.
  pub fn has_root_module(&self) -> bool {
    self.module_path(&self.root_module()).is_file()
  }

  /// Load and parse one modulefile.
  pub fn load_module(&self, module: &str) -> Result<ModuleDescriptor, StoreError> {
    let path = self.module_path(module);
    let text = fs::read_to_string(&path).map_err(|source| {
      if source.kind() == io::ErrorKind::NotFound {
        StoreError::MissingModule {
          name: module.to_string(),
          path: path.clone(),
        }
      } else {
        StoreError::Read {
          path: path.clone(),
          source,
        }
      }
    })?;

    let descriptor = module::parse(&text).map_err(|source| StoreError::Parse {
      path: path.clone(),
      source,
    })?;
    if descriptor.name != module {
      return Err(StoreError::NameMismatch {
        path,
        expected: module.to_string(),
        found: descriptor.name,
      });
    }
    debug!(module = %module, mutations = descriptor.mutations().len(), "loaded modulefile");
    Ok(descriptor)
  }

  /// Load the global module and every application it loads.
  pub fn load_tree(&self) -> Result<ModuleTree, StoreError> {
    let root_name = self.root_module();
    let root = match self.load_module(&root_name) {
      Ok(root) => root,
      Err(StoreError::MissingModule { .. }) => {
        return Err(StoreError::NotInitialized {
          path: self.root.clone(),
        });
      }
      Err(e) => return Err(e),
    };

    let children = root
      .children()
      .iter()
      .map(|child| self.load_module(child))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(ModuleTree::from_parts(root, children)?)
  }

  /// Render and atomically write one modulefile, returning its path.
  pub fn save_module(&self, descriptor: &ModuleDescriptor) -> Result<PathBuf, StoreError> {
    let dir = self.module_dir();
    fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
      path: dir.clone(),
      source,
    })?;

    let path = self.module_path(&descriptor.name);
    atomic_write(&path, &module::render(descriptor)).map_err(|source| StoreError::Write {
      path: path.clone(),
      source,
    })?;
    info!(module = %descriptor.name, path = %path.display(), "wrote modulefile");
    Ok(path)
  }

  /// Delete one modulefile. A file that is already gone is not an error.
  pub fn delete_module(&self, module: &str) -> Result<(), StoreError> {
    let path = self.module_path(module);
    match fs::remove_file(&path) {
      Ok(()) => {
        info!(module = %module, path = %path.display(), "removed modulefile");
        Ok(())
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(StoreError::Remove { path, source }),
    }
  }

  /// Delete the files of every child removed from `tree`.
  pub fn delete_removed(&self, tree: &ModuleTree) -> Result<(), StoreError> {
    for name in tree.removed() {
      self.delete_module(name)?;
    }
    Ok(())
  }
}
