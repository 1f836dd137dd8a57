//! Initialize and deinitialize command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, fixture_content};

#[test]
fn initialize_patches_activate_and_writes_module() {
  let env = TestEnv::new("Demo_Env");

  env
    .venvmod_cmd()
    .arg("initialize")
    .arg(&env.venv)
    .arg("--activate-log")
    .arg("demo ready")
    .assert()
    .success()
    .stdout(predicate::str::contains("Initialized"));

  let activate = env.activate();
  assert!(activate.contains("# >>> venvmod >>>"));
  assert!(activate.contains("module load 'demo-env'"));
  let module = env.module("demo-env");
  assert!(module.starts_with("#%Module"));
  assert!(module.contains("puts stderr {demo ready}"));
}

#[test]
fn initialize_twice_fails_and_keeps_activate() {
  let env = TestEnv::initialized("twice");
  let before = env.activate();

  env
    .venvmod_cmd()
    .arg("initialize")
    .arg(&env.venv)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("already a venvmod environment"));

  assert_eq!(env.activate(), before);
}

#[test]
fn initialize_force_repatches() {
  let env = TestEnv::initialized("forced");

  env
    .venvmod_cmd()
    .arg("initialize")
    .arg(&env.venv)
    .arg("--force")
    .arg("--modules-init")
    .arg("/usr/share/modules/init/bash")
    .assert()
    .success();

  let activate = env.activate();
  assert_eq!(activate.matches("_test_activate_status ()").count(), 1);
  assert!(activate.contains(". '/usr/share/modules/init/bash'"));
}

#[test]
fn initialize_reads_environment() {
  let env = TestEnv::new("readenv");

  env
    .venvmod_cmd()
    .env("READENV_EXPORTS", "FOO=1 BAR=2")
    .env("READENV_MODULEFILES", "gcc")
    .arg("initialize")
    .arg(&env.venv)
    .arg("--read-env")
    .assert()
    .success()
    .stdout(predicate::str::contains("Read 3 records"));

  let module = env.module("readenv");
  assert!(module.contains("module load gcc\nsetenv FOO 1\nsetenv BAR 2\n"));
}

#[test]
fn malformed_environment_entry_fails_without_writing() {
  let env = TestEnv::new("broken");

  env
    .venvmod_cmd()
    .env("BROKEN_EXPORTS", "bad")
    .arg("initialize")
    .arg(&env.venv)
    .arg("--read-env")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("malformed entry 'bad'"));

  assert!(!env.module_path("broken").exists());
  assert!(!env.activate().contains("venvmod"));
}

#[test]
fn deinitialize_restores_activate() {
  let env = TestEnv::initialized("undo");
  env.venvmod_cmd().arg("add-appli").arg(&env.venv).arg("tool").assert().success();

  env
    .venvmod_cmd()
    .arg("deinitialize")
    .arg(&env.venv)
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 2 modules"));

  let expected = fixture_content("activate").replace("__VENV__", &env.venv.to_string_lossy());
  assert_eq!(env.activate(), expected);
  assert!(!env.venv.join("etc").join("modulefiles").exists());
}
