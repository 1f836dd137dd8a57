//! Application module command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn add_appli_links_module() {
  let env = TestEnv::initialized("proj");

  env
    .venvmod_cmd()
    .arg("add-appli")
    .arg(&env.venv)
    .arg("Solver")
    .assert()
    .success()
    .stdout(predicate::str::contains("proj-solver"));

  assert!(env.module_path("proj-solver").is_file());
  assert!(env.module("proj").contains("module load proj-solver"));
}

#[test]
fn add_appli_twice_fails() {
  let env = TestEnv::initialized("proj");
  env.venvmod_cmd().arg("add-appli").arg(&env.venv).arg("a").assert().success();

  env
    .venvmod_cmd()
    .arg("add-appli")
    .arg(&env.venv)
    .arg("a")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_appli_accepts_several_names() {
  let env = TestEnv::initialized("proj");

  env
    .venvmod_cmd()
    .arg("add-appli")
    .arg(&env.venv)
    .args(["a", "b", "A"])
    .assert()
    .success()
    .stdout(predicate::str::contains("proj-a").and(predicate::str::contains("proj-b")));

  let root = env.module("proj");
  assert_eq!(root.matches("module load proj-a").count(), 1);
  assert!(root.contains("module load proj-b"));
}

#[test]
fn add_appli_rejects_path_separator() {
  let env = TestEnv::initialized("proj");
  let root = env.module("proj");

  env
    .venvmod_cmd()
    .arg("add-appli")
    .arg(&env.venv)
    .args(["ok", "x/y"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("invalid application name 'x/y'"));

  assert!(!env.module_path("proj-ok").exists());
  assert_eq!(env.module("proj"), root);
}

#[test]
fn add_appli_with_environ_reads_appli_variables() {
  let env = TestEnv::initialized("proj");

  env
    .venvmod_cmd()
    .env("SOLVER_PYTHONPATH", "/opt/solver/lib:/opt/solver/ext")
    .arg("add-appli")
    .arg(&env.venv)
    .arg("solver")
    .arg("--environ")
    .assert()
    .success();

  let module = env.module("proj-solver");
  assert!(module.contains("prepend-path PYTHONPATH /opt/solver/lib\nprepend-path PYTHONPATH /opt/solver/ext\n"));
}

#[test]
fn rm_appli_unlinks_module() {
  let env = TestEnv::initialized("proj");
  env.venvmod_cmd().arg("add-appli").arg(&env.venv).arg("a").assert().success();
  env.venvmod_cmd().arg("add-appli").arg(&env.venv).arg("b").assert().success();

  env.venvmod_cmd().arg("rm-appli").arg(&env.venv).arg("a").assert().success();

  assert!(!env.module_path("proj-a").exists());
  let root = env.module("proj");
  assert!(!root.contains("module load proj-a"));
  assert!(root.contains("module load proj-b"));
}

#[test]
fn rm_missing_appli_fails() {
  let env = TestEnv::initialized("proj");

  env
    .venvmod_cmd()
    .arg("rm-appli")
    .arg(&env.venv)
    .arg("ghost")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("not found"));
}
