//! Rendering descriptors to Tcl modulefiles and reading them back.
//!
//! The generated file has three parts:
//!
//! ```text
//! #%Module header            # category, name, help, optional load message
//! ## venvmod directives      # one line per mutation, in insertion order
//! ## venvmod applications    # root only: one `module load` per child
//! ```
//!
//! Only the sections after the directives marker carry state; the header is
//! regenerated on every write apart from the fields stored in the descriptor.

use std::fmt::Write;

use thiserror::Error;

use super::tcl;
use super::{ModuleDescriptor, Mutation, MutationKind};
use crate::consts::APP_NAME;

const DIRECTIVES_MARKER: &str = "## venvmod directives";
const APPLICATIONS_MARKER: &str = "## venvmod applications";
const LOAD_BLOCK_OPEN: &str = "if { [ module-info mode load ] } {";

#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
  pub line: usize,
  pub message: String,
}

impl ParseError {
  fn new(line: usize, message: impl Into<String>) -> Self {
    Self {
      line,
      message: message.into(),
    }
  }
}

/// Render a descriptor as modulefile text.
pub fn render(module: &ModuleDescriptor) -> String {
  let mut out = String::new();
  // Writing to a String cannot fail.
  let _ = write_module(&mut out, module);
  out
}

fn write_module(out: &mut String, module: &ModuleDescriptor) -> std::fmt::Result {
  writeln!(out, "#%Module -*- tcl -*-")?;
  writeln!(out, "##")?;
  writeln!(out, "## modulefile for {}", module.name)?;
  writeln!(out, "## generated by {}, edit with the {} commands", APP_NAME, APP_NAME)?;
  writeln!(out, "##")?;
  writeln!(out, "set              category             {}", tcl::quote(&module.category))?;
  writeln!(out, "set              name                 {}", tcl::quote(&module.name))?;
  writeln!(out)?;
  writeln!(out, "proc ModulesHelp {{ }} {{")?;
  writeln!(out, "  puts stderr \"\\tAdds $name to your environment,\"")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  writeln!(out, "module-whatis \"adds $name to your environment\"")?;
  writeln!(out)?;

  if let Some(message) = &module.load_message {
    writeln!(out, "{}", LOAD_BLOCK_OPEN)?;
    writeln!(out, "    puts stderr {}", tcl::quote(message))?;
    writeln!(out, "}}")?;
    writeln!(out)?;
  }

  writeln!(out, "conflict $category")?;
  writeln!(out)?;

  writeln!(out, "{}", DIRECTIVES_MARKER)?;
  for mutation in module.mutations() {
    writeln!(out, "{}", render_mutation(mutation))?;
  }

  if !module.children().is_empty() {
    writeln!(out, "{}", APPLICATIONS_MARKER)?;
    for child in module.children() {
      writeln!(out, "module load {}", tcl::quote(child))?;
    }
  }

  Ok(())
}

/// Render one mutation as a single modulefile directive line.
pub fn render_mutation(mutation: &Mutation) -> String {
  let keywords = mutation.kind().directive().join(" ");
  format!("{} {}", keywords, tcl::join(mutation.args()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
  Header,
  Directives,
  Applications,
}

/// Parse modulefile text produced by [`render`].
pub fn parse(text: &str) -> Result<ModuleDescriptor, ParseError> {
  let mut section = Section::Header;
  let mut name = None;
  let mut category = None;
  let mut load_message = None;
  let mut in_load_block = false;
  let mut mutations = Vec::new();
  let mut children: Vec<String> = Vec::new();

  for (index, raw) in text.lines().enumerate() {
    let line_no = index + 1;
    let line = raw.trim();

    if line == DIRECTIVES_MARKER {
      if section != Section::Header {
        return Err(ParseError::new(line_no, "duplicate directives marker"));
      }
      section = Section::Directives;
      continue;
    }
    if line == APPLICATIONS_MARKER {
      if section != Section::Directives {
        return Err(ParseError::new(line_no, "applications marker outside of directives"));
      }
      section = Section::Applications;
      continue;
    }

    match section {
      Section::Header => {
        if line == LOAD_BLOCK_OPEN {
          in_load_block = true;
        } else if in_load_block && line == "}" {
          in_load_block = false;
        } else if in_load_block && line.starts_with("puts stderr") {
          let words = split_line(line_no, line)?;
          load_message = words.get(2).cloned();
        } else if line.starts_with("set ") {
          let words = split_line(line_no, line)?;
          match (words.get(1).map(String::as_str), words.get(2)) {
            (Some("name"), Some(value)) => name = Some(value.clone()),
            (Some("category"), Some(value)) => category = Some(value.clone()),
            _ => {}
          }
        }
      }
      Section::Directives => {
        if line.is_empty() || line.starts_with('#') {
          continue;
        }
        let words = split_line(line_no, line)?;
        mutations.push(parse_directive(line_no, words)?);
      }
      Section::Applications => {
        if line.is_empty() || line.starts_with('#') {
          continue;
        }
        let words = split_line(line_no, line)?;
        match words.as_slice() {
          [module, load, child] if module == "module" && load == "load" => {
            if children.contains(child) {
              return Err(ParseError::new(line_no, format!("application '{}' listed twice", child)));
            }
            children.push(child.clone());
          }
          _ => {
            return Err(ParseError::new(
              line_no,
              format!("expected 'module load <application>', found '{}'", line),
            ));
          }
        }
      }
    }
  }

  if section == Section::Header {
    return Err(ParseError::new(
      text.lines().count(),
      format!("missing '{}' marker, not a {} modulefile", DIRECTIVES_MARKER, APP_NAME),
    ));
  }

  let name = name.ok_or_else(|| ParseError::new(0, "missing 'set name' line"))?;
  let category = category.unwrap_or_else(|| APP_NAME.to_string());

  let mut module = ModuleDescriptor::new(name, category).with_load_message(load_message);
  module.extend(mutations);
  for child in children {
    module
      .link_child(&child)
      .map_err(|e| ParseError::new(0, e.to_string()))?;
  }
  Ok(module)
}

fn split_line(line_no: usize, line: &str) -> Result<Vec<String>, ParseError> {
  tcl::split(line).map_err(|e| ParseError::new(line_no, e.to_string()))
}

fn parse_directive(line_no: usize, words: Vec<String>) -> Result<Mutation, ParseError> {
  let (kind, skip) = match words.as_slice() {
    [module, sub, ..] if module == "module" => match sub.as_str() {
      "load" => (MutationKind::ModuleLoad, 2),
      "use" => (MutationKind::ModuleUse, 2),
      other => {
        return Err(ParseError::new(line_no, format!("unsupported module subcommand '{}'", other)));
      }
    },
    [keyword, ..] => {
      let kind = MutationKind::ALL
        .into_iter()
        .find(|kind| kind.directive() == [keyword.as_str()].as_slice())
        .ok_or_else(|| ParseError::new(line_no, format!("unsupported directive '{}'", keyword)))?;
      (kind, 1)
    }
    [] => return Err(ParseError::new(line_no, "empty directive")),
  };

  let args = words.into_iter().skip(skip).collect();
  Mutation::new(kind, args).map_err(|e| ParseError::new(line_no, e.to_string()))
}
