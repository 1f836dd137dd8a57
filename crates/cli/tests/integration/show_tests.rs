//! Show command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn show_lists_modules_in_load_order() {
  let env = TestEnv::initialized("shown");
  env.venvmod_cmd().arg("add-appli").arg(&env.venv).arg("zeta").assert().success();
  env.venvmod_cmd().arg("add-appli").arg(&env.venv).arg("alpha").assert().success();

  let output = env.venvmod_cmd().arg("show").arg(&env.venv).assert().success();
  let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();

  let zeta = stdout.find("shown-zeta").unwrap();
  let alpha = stdout.find("shown-alpha").unwrap();
  assert!(zeta < alpha);
}

#[test]
fn show_json_is_machine_readable() {
  let env = TestEnv::initialized("json");
  env
    .venvmod_cmd()
    .arg("cmd-module-use")
    .arg(&env.venv)
    .arg("/opt/modulefiles")
    .assert()
    .success();

  let output = env
    .venvmod_cmd()
    .arg("show")
    .arg(&env.venv)
    .args(["--format", "json"])
    .assert()
    .success();
  let value: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();

  assert_eq!(value["root"]["name"], "json");
  assert_eq!(value["root"]["mutations"][0]["kind"], "module-use");
  assert_eq!(value["root"]["mutations"][0]["args"][0], "/opt/modulefiles");
  assert!(value["applications"].as_array().unwrap().is_empty());
}

#[test]
fn show_rejects_unknown_format() {
  let env = TestEnv::initialized("fmt");
  env
    .venvmod_cmd()
    .arg("show")
    .arg(&env.venv)
    .args(["--format", "yaml"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("invalid value"));
}
