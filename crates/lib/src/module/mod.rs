//! Module descriptors and their modulefile representation.
//!
//! A virtual environment owns one global module (the tree root) which loads
//! zero or more application modules. Every module is an ordered list of
//! [`Mutation`] records rendered as a Tcl modulefile.

mod descriptor;
mod mutation;
mod render;
pub mod tcl;

use thiserror::Error;

pub use descriptor::{ModuleDescriptor, ModuleTree};
pub use mutation::{Mutation, MutationKind};
pub use render::{ParseError, parse, render};

/// Errors raised by descriptor and tree invariants.
#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("unknown command kind '{0}', expected one of: append-path, prepend-path, remove-path, setenv, set-alias, module-load, module-use, source-sh")]
  InvalidKind(String),

  #[error("invalid arguments for {kind}: {reason}")]
  InvalidArgs { kind: MutationKind, reason: String },

  #[error("invalid application name '{name}': {reason}")]
  InvalidName { name: String, reason: &'static str },

  #[error("module '{0}' already exists")]
  DuplicateName(String),

  #[error("module '{0}' not found")]
  NotFound(String),
}
