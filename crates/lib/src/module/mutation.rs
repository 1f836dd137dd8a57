//! Mutation records: one environment-change directive each.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::DescriptorError;

/// The fixed set of operations a modulefile can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
  AppendPath,
  PrependPath,
  RemovePath,
  Setenv,
  SetAlias,
  ModuleLoad,
  ModuleUse,
  SourceSh,
}

impl MutationKind {
  pub const ALL: [MutationKind; 8] = [
    Self::AppendPath,
    Self::PrependPath,
    Self::RemovePath,
    Self::Setenv,
    Self::SetAlias,
    Self::ModuleLoad,
    Self::ModuleUse,
    Self::SourceSh,
  ];

  /// Command-line spelling of the kind (`cmd-<kind>`).
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::AppendPath => "append-path",
      Self::PrependPath => "prepend-path",
      Self::RemovePath => "remove-path",
      Self::Setenv => "setenv",
      Self::SetAlias => "set-alias",
      Self::ModuleLoad => "module-load",
      Self::ModuleUse => "module-use",
      Self::SourceSh => "source-sh",
    }
  }

  /// Modulefile directive keyword(s) emitted for this kind.
  pub fn directive(&self) -> &'static [&'static str] {
    match self {
      Self::AppendPath => &["append-path"],
      Self::PrependPath => &["prepend-path"],
      Self::RemovePath => &["remove-path"],
      Self::Setenv => &["setenv"],
      Self::SetAlias => &["set-alias"],
      Self::ModuleLoad => &["module", "load"],
      Self::ModuleUse => &["module", "use"],
      Self::SourceSh => &["source-sh"],
    }
  }

  /// Accepted argument count as `(min, max)`; `None` means unbounded.
  fn arity(&self) -> (usize, Option<usize>) {
    match self {
      Self::AppendPath | Self::PrependPath => (2, None),
      Self::RemovePath | Self::Setenv | Self::SetAlias => (2, Some(2)),
      Self::ModuleLoad | Self::ModuleUse => (1, None),
      Self::SourceSh => (2, None),
    }
  }

  /// Human description of the expected arguments, used in error messages.
  pub fn usage(&self) -> &'static str {
    match self {
      Self::AppendPath | Self::PrependPath => "VARIABLE VALUE...",
      Self::RemovePath | Self::Setenv => "VARIABLE VALUE",
      Self::SetAlias => "ALIAS VALUE",
      Self::ModuleLoad => "MODULE...",
      Self::ModuleUse => "PATH...",
      Self::SourceSh => "SHELL SCRIPT [ARG...]",
    }
  }
}

impl fmt::Display for MutationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for MutationKind {
  type Err = DescriptorError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| DescriptorError::InvalidKind(s.to_string()))
  }
}

/// A single validated operation and its arguments.
///
/// Records are immutable once built; the only way to get one is through
/// [`Mutation::new`], which enforces the per-kind argument contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation {
  kind: MutationKind,
  args: Vec<String>,
}

impl Mutation {
  pub fn new(kind: MutationKind, args: Vec<String>) -> Result<Self, DescriptorError> {
    if args.is_empty() {
      return Err(DescriptorError::InvalidArgs {
        kind,
        reason: format!("no arguments given, expected {}", kind.usage()),
      });
    }

    let (min, max) = kind.arity();
    if args.len() < min || max.is_some_and(|max| args.len() > max) {
      return Err(DescriptorError::InvalidArgs {
        kind,
        reason: format!("got {} argument(s), expected {}", args.len(), kind.usage()),
      });
    }

    // setenv may define a variable to the empty string, nothing else may be empty
    let empty_allowed = |index: usize| kind == MutationKind::Setenv && index == 1;
    if args.iter().enumerate().any(|(i, arg)| arg.is_empty() && !empty_allowed(i)) {
      return Err(DescriptorError::InvalidArgs {
        kind,
        reason: "arguments must not be empty".to_string(),
      });
    }

    Ok(Self { kind, args })
  }

  /// Build a record from its command-line kind spelling.
  pub fn parse(kind: &str, args: Vec<String>) -> Result<Self, DescriptorError> {
    Self::new(kind.parse()?, args)
  }

  pub fn kind(&self) -> MutationKind {
    self.kind
  }

  pub fn args(&self) -> &[String] {
    &self.args
  }
}

impl fmt::Display for Mutation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.kind, self.args.join(" "))
  }
}
