//! `cmd-*` and `read-env` command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn commands_render_in_invocation_order() {
  let env = TestEnv::initialized("order");

  env
    .venvmod_cmd()
    .args(["cmd-setenv"])
    .arg(&env.venv)
    .args(["CC", "gcc"])
    .assert()
    .success();
  env
    .venvmod_cmd()
    .arg("cmd-prepend-path")
    .arg(&env.venv)
    .args(["PATH", "/opt/bin"])
    .assert()
    .success();
  env
    .venvmod_cmd()
    .arg("cmd-module-load")
    .arg(&env.venv)
    .args(["cmake", "ninja"])
    .assert()
    .success();

  let module = env.module("order");
  let directives: Vec<_> = module
    .lines()
    .skip_while(|l| *l != "## venvmod directives")
    .skip(1)
    .collect();
  assert_eq!(
    directives,
    vec!["setenv CC gcc", "prepend-path PATH /opt/bin", "module load cmake ninja"]
  );
}

#[test]
fn command_targets_application_module() {
  let env = TestEnv::initialized("target");
  env.venvmod_cmd().arg("add-appli").arg(&env.venv).arg("app").assert().success();

  env
    .venvmod_cmd()
    .arg("cmd-set-alias")
    .arg("--appli")
    .arg("app")
    .arg(&env.venv)
    .args(["ll", "ls -l"])
    .assert()
    .success();

  assert!(env.module("target-app").contains("set-alias ll {ls -l}"));
  assert!(!env.module("target").contains("set-alias"));
}

#[test]
fn setenv_with_three_args_fails() {
  let env = TestEnv::initialized("arity");

  env
    .venvmod_cmd()
    .arg("cmd-setenv")
    .arg(&env.venv)
    .args(["A", "1", "2"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("invalid arguments for setenv"));
}

#[test]
fn setenv_accepts_empty_value() {
  let env = TestEnv::initialized("empty");

  env
    .venvmod_cmd()
    .arg("cmd-setenv")
    .arg(&env.venv)
    .args(["EMPTY", ""])
    .assert()
    .success();

  assert!(env.module("empty").contains("setenv EMPTY {}"));
}

#[test]
fn source_sh_requires_shell_and_script() {
  let env = TestEnv::initialized("srcsh");

  env
    .venvmod_cmd()
    .arg("cmd-source-sh")
    .arg(&env.venv)
    .arg("bash")
    .assert()
    .code(1);

  env
    .venvmod_cmd()
    .arg("cmd-source-sh")
    .arg(&env.venv)
    .args(["bash", "/opt/env.sh", "--quiet"])
    .assert()
    .success();

  assert!(env.module("srcsh").contains("source-sh bash /opt/env.sh --quiet"));
}

#[test]
fn read_env_appends_after_existing_records() {
  let env = TestEnv::initialized("later");
  env
    .venvmod_cmd()
    .arg("cmd-setenv")
    .arg(&env.venv)
    .args(["FIRST", "1"])
    .assert()
    .success();

  env
    .venvmod_cmd()
    .env("LATER_ALIASES", "py='python3'")
    .arg("read-env")
    .arg(&env.venv)
    .assert()
    .success()
    .stdout(predicate::str::contains("Added 1 record"));

  let module = env.module("later");
  assert!(module.contains("setenv FIRST 1\nset-alias py python3\n"));
}

#[test]
fn read_env_without_variables_is_a_no_op() {
  let env = TestEnv::initialized("quiet");
  let before = env.module("quiet");

  env
    .venvmod_cmd()
    .arg("read-env")
    .arg(&env.venv)
    .assert()
    .success()
    .stdout(predicate::str::contains("No environment variables"));

  assert_eq!(env.module("quiet"), before);
}
