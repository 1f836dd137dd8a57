//! Implementation of the `venvmod show` command.
//!
//! Prints the global module, its records and every application module it
//! loads, in load order.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use venvmod_lib::appli::show;
use venvmod_lib::module::ModuleDescriptor;

use crate::output::{OutputFormat, print_json, symbols};

pub fn cmd_show(venv: &Path, format: OutputFormat) -> Result<()> {
  let tree = show(venv).context("Failed to load modules")?;

  if format.is_json() {
    return print_json(&tree);
  }

  print_module(tree.root(), "");
  for child in tree.children() {
    print_module(child, "  ");
  }
  Ok(())
}

fn print_module(module: &ModuleDescriptor, indent: &str) {
  let bullet = if indent.is_empty() { symbols::INFO } else { symbols::ARROW };
  println!(
    "{}{} {} {}",
    indent,
    bullet,
    module.name.if_supports_color(Stream::Stdout, |s| s.bold()),
    format!("({})", module.category).if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
  if let Some(message) = &module.load_message {
    println!("{}    load message: {}", indent, message);
  }
  for mutation in module.mutations() {
    println!("{}    {}", indent, mutation);
  }
}
