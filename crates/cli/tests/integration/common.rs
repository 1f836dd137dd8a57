//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding one fake virtual
/// environment with a `bin/activate` script.
pub struct TestEnv {
  pub temp: TempDir,
  pub venv: PathBuf,
}

impl TestEnv {
  /// Create a fake virtual environment named `name`.
  pub fn new(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join(name);
    std::fs::create_dir_all(dir.join("bin")).unwrap();
    let venv = dunce::canonicalize(&dir).unwrap_or(dir);
    let activate = fixture_content("activate").replace("__VENV__", &venv.to_string_lossy());
    std::fs::write(venv.join("bin").join("activate"), activate).unwrap();
    Self { temp, venv }
  }

  /// Create and initialize a virtual environment named `name`.
  pub fn initialized(name: &str) -> Self {
    let env = Self::new(name);
    env.venvmod_cmd().arg("initialize").arg(&env.venv).assert().success();
    env
  }

  pub fn activate(&self) -> String {
    std::fs::read_to_string(self.venv.join("bin").join("activate")).unwrap()
  }

  /// Content of a modulefile.
  pub fn module(&self, name: &str) -> String {
    std::fs::read_to_string(self.module_path(name)).unwrap()
  }

  pub fn module_path(&self, name: &str) -> PathBuf {
    self.venv.join("etc").join("modulefiles").join(name)
  }

  /// Get a Command for the venvmod binary.
  ///
  /// The process environment is cleared of variables the reader or
  /// `test-import` would pick up, so only what a test sets is visible.
  pub fn venvmod_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("venvmod");
    cmd.env_remove("VIRTUAL_ENV");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(self.temp.path());
    cmd
  }
}
