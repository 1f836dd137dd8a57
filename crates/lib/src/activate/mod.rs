//! Activation hook patcher.
//!
//! Wires the global module into a venv's `bin/activate`: the module is used
//! and loaded when the environment is activated, unloaded and unused by
//! `deactivate`, and the module command's exit status becomes the status of
//! `source bin/activate` and `deactivate`.
//!
//! Every insertion is a whole-line block between [`BLOCK_BEGIN`] and
//! [`BLOCK_END`], so a patched script is detectable and [`unpatch`] restores
//! the original text.

mod templates;

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

pub use templates::{BLOCK_BEGIN, BLOCK_END, HEADER_LINE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivateError {
  #[error("activate script is already patched by venvmod")]
  AlreadyInitialized,

  #[error("activate script is not patched by venvmod")]
  NotInitialized,

  #[error("activate script has no '{0}' line, is it a venv or virtualenv activate script?")]
  MissingAnchor(&'static str),

  #[error("unterminated venvmod block starting at line {0}")]
  UnbalancedBlock(usize),
}

/// What the hook loads.
#[derive(Debug, Clone)]
pub struct ActivationHook {
  /// Directory added to `MODULEPATH`.
  pub module_dir: PathBuf,
  /// Global module name.
  pub module: String,
  /// Module system init script to source first, if the shell does not already define `module`.
  pub modules_init: Option<PathBuf>,
}

/// Whether `script` contains a venvmod block.
pub fn is_patched(script: &str) -> bool {
  script.lines().any(|line| line.trim() == BLOCK_BEGIN)
}

/// Quote a string for POSIX shells.
pub fn shell_quote(value: &str) -> String {
  format!("'{}'", value.replace('\'', r"'\''"))
}

#[derive(Debug, Default)]
struct Anchors {
  header: usize,
  deactivate_fn: Option<usize>,
  unset_venv: Option<usize>,
  unset_deactivate: Option<usize>,
  nondestructive: Option<usize>,
}

fn find_anchors(lines: &[&str]) -> Result<Anchors, ActivateError> {
  let mut anchors = Anchors {
    header: lines
      .iter()
      .position(|l| l.to_lowercase().contains("you cannot run it directly"))
      .unwrap_or_else(|| 1.min(lines.len().saturating_sub(1))),
    ..Default::default()
  };

  for (index, line) in lines.iter().enumerate() {
    let trimmed = line.trim();
    if anchors.deactivate_fn.is_none() && trimmed.starts_with("deactivate () {") {
      anchors.deactivate_fn = Some(index);
    } else if anchors.unset_venv.is_none() && trimmed.split_whitespace().eq(["unset", "VIRTUAL_ENV"]) {
      anchors.unset_venv = Some(index);
    } else if anchors.unset_deactivate.is_none() && trimmed == "unset -f deactivate" {
      anchors.unset_deactivate = Some(index);
    } else if anchors.nondestructive.is_none() && trimmed == "deactivate nondestructive" {
      anchors.nondestructive = Some(index);
    }
  }

  anchors
    .deactivate_fn
    .ok_or(ActivateError::MissingAnchor("deactivate () {"))?;
  anchors
    .unset_venv
    .ok_or(ActivateError::MissingAnchor("unset VIRTUAL_ENV"))?;
  anchors
    .unset_deactivate
    .ok_or(ActivateError::MissingAnchor("unset -f deactivate"))?;
  anchors
    .nondestructive
    .ok_or(ActivateError::MissingAnchor("deactivate nondestructive"))?;
  Ok(anchors)
}

fn indent_of(line: &str) -> &str {
  &line[..line.len() - line.trim_start().len()]
}

fn block(out: &mut String, indent: &str, body: &str) {
  out.push_str(indent);
  out.push_str(BLOCK_BEGIN);
  out.push('\n');
  out.push_str(body);
  out.push_str(indent);
  out.push_str(BLOCK_END);
  out.push('\n');
}

fn fill(template: &str, indent: &str, hook: &ActivationHook) -> String {
  template
    .replace("{indent}", indent)
    .replace("{module}", &shell_quote(&hook.module))
    .replace("{module_dir}", &shell_quote(&hook.module_dir.to_string_lossy()))
}

/// Insert the venvmod blocks into an unpatched activate script.
pub fn patch(script: &str, hook: &ActivationHook) -> Result<String, ActivateError> {
  if is_patched(script) {
    return Err(ActivateError::AlreadyInitialized);
  }

  let lines: Vec<&str> = script.split_inclusive('\n').collect();
  let anchors = find_anchors(&lines)?;
  let mut out = String::with_capacity(script.len() + 2048);

  for (index, line) in lines.iter().enumerate() {
    let indent = indent_of(line);

    if Some(index) == anchors.deactivate_fn {
      block(&mut out, indent, &fill(templates::TEST_DEACTIVATE_STATUS, indent, hook));
    }

    out.push_str(line);
    if !line.ends_with('\n') {
      out.push('\n');
    }

    // The header may share its line with another anchor, both blocks go in.
    if index == anchors.header {
      let mut body = format!("{}\n", HEADER_LINE);
      if let Some(init) = &hook.modules_init {
        body.push_str(
          &templates::SOURCE_INIT
            .replace("{indent}", "")
            .replace("{init}", &shell_quote(&init.to_string_lossy())),
        );
      }
      block(&mut out, "", &body);
    }
    if Some(index) == anchors.unset_venv {
      block(&mut out, indent, &fill(templates::UNLOAD_MODULES, indent, hook));
    }
    if Some(index) == anchors.unset_deactivate {
      block(&mut out, indent, &fill(templates::RETURN_DEACTIVATE_STATUS, indent, hook));
    }
    if Some(index) == anchors.nondestructive {
      block(&mut out, indent, &fill(templates::LOAD_MODULES, indent, hook));
    }
  }

  let mut closing = templates::TEST_ACTIVATE_STATUS.to_string();
  if !script.is_empty() && !script.ends_with('\n') {
    closing.push_str(templates::NO_FINAL_NEWLINE);
    closing.push('\n');
  }
  block(&mut out, "", &closing);
  debug!(module = %hook.module, "patched activate script");
  Ok(out)
}

/// Remove every venvmod block from a patched activate script.
pub fn unpatch(script: &str) -> Result<String, ActivateError> {
  if !is_patched(script) {
    return Err(ActivateError::NotInitialized);
  }

  let mut out = String::with_capacity(script.len());
  let mut open_at = None;
  let mut no_final_newline = false;
  for (index, line) in script.split_inclusive('\n').enumerate() {
    match (line.trim(), open_at) {
      (BLOCK_BEGIN, None) => open_at = Some(index + 1),
      (BLOCK_BEGIN, Some(start)) => return Err(ActivateError::UnbalancedBlock(start)),
      (BLOCK_END, Some(_)) => open_at = None,
      (templates::NO_FINAL_NEWLINE, Some(_)) => no_final_newline = true,
      (_, Some(_)) => {}
      (_, None) => out.push_str(line),
    }
  }

  if let Some(start) = open_at {
    return Err(ActivateError::UnbalancedBlock(start));
  }
  if no_final_newline && out.ends_with('\n') {
    out.pop();
  }
  Ok(out)
}

/// Replace existing venvmod blocks with a fresh patch.
pub fn repatch(script: &str, hook: &ActivationHook) -> Result<String, ActivateError> {
  let clean = if is_patched(script) { unpatch(script)? } else { script.to_string() };
  patch(&clean, hook)
}
