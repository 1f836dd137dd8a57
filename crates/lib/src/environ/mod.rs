//! Environment variable reader.
//!
//! Translates the `<NAME>_*` variable convention into mutation records. The
//! reader works on a snapshot of the environment so callers decide where the
//! variables come from; the CLI passes the process environment.
//!
//! | suffix             | separator  | record                               |
//! |--------------------|------------|--------------------------------------|
//! | `_LD_LIBRARY_PATH` | `:`        | `prepend-path LD_LIBRARY_PATH <elem>` |
//! | `_PYTHONPATH`      | `:`        | `prepend-path PYTHONPATH <elem>`     |
//! | `_PATH`            | `:`        | `prepend-path PATH <elem>`           |
//! | `_MODULE_USE`      | whitespace | `module-use <elem>`                  |
//! | `_MODULEFILES`     | whitespace | `module-load <elem>`                 |
//! | `_SOURCEFILES`     | `;`        | `source-sh <shell> <script> [args]`  |
//! | `_EXPORTS`         | whitespace | `setenv <var> <value>` from `var=value` |
//! | `_ALIASES`         | whitespace | `set-alias <name> <value>` from `name="value"` |
//! | `_REMOVE_PATHS`    | whitespace | `remove-path <var> <value>` from `var=value` |

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::module::{Mutation, MutationKind};
use crate::naming::env_prefix;

#[derive(Debug, Error)]
pub enum EnvError {
  #[error("malformed entry '{token}' in {variable}: {reason}")]
  MalformedEntry {
    variable: String,
    token: String,
    reason: String,
  },
}

/// Environment snapshot: variable name to value.
pub type EnvSnapshot = BTreeMap<String, String>;

/// Capture the current process environment, skipping non UTF-8 entries.
pub fn process_snapshot() -> EnvSnapshot {
  std::env::vars_os()
    .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
    .collect()
}

#[derive(Debug, Clone, Copy)]
enum Suffix {
  PrependPath(&'static str),
  ModuleUse,
  ModuleFiles,
  SourceFiles,
  Exports,
  Aliases,
  RemovePaths,
}

/// Scan order of the recognized suffixes.
const SUFFIXES: [(&str, Suffix); 9] = [
  ("_LD_LIBRARY_PATH", Suffix::PrependPath("LD_LIBRARY_PATH")),
  ("_PYTHONPATH", Suffix::PrependPath("PYTHONPATH")),
  ("_PATH", Suffix::PrependPath("PATH")),
  ("_MODULE_USE", Suffix::ModuleUse),
  ("_MODULEFILES", Suffix::ModuleFiles),
  ("_SOURCEFILES", Suffix::SourceFiles),
  ("_EXPORTS", Suffix::Exports),
  ("_ALIASES", Suffix::Aliases),
  ("_REMOVE_PATHS", Suffix::RemovePaths),
];

/// Names of the variables the reader looks at for `name`, in scan order.
pub fn variable_names(name: &str) -> Vec<String> {
  let prefix = env_prefix(name);
  SUFFIXES.iter().map(|(suffix, _)| format!("{}{}", prefix, suffix)).collect()
}

/// Read the mutation records declared for `name` in `env`.
///
/// `name` is normalized to its variable prefix first (`my-app.2` reads
/// `MY_APP_2_*`). Either every record is returned or, on the first malformed
/// entry, none.
pub fn read_env(name: &str, env: &EnvSnapshot) -> Result<Vec<Mutation>, EnvError> {
  let prefix = env_prefix(name);
  let mut records = Vec::new();

  for (suffix, rule) in SUFFIXES {
    let variable = format!("{}{}", prefix, suffix);
    let Some(value) = env.get(&variable) else {
      continue;
    };
    let before = records.len();
    read_variable(&variable, value, rule, &mut records)?;
    debug!(variable = %variable, records = records.len() - before, "read environment variable");
  }

  Ok(records)
}

fn read_variable(variable: &str, value: &str, rule: Suffix, out: &mut Vec<Mutation>) -> Result<(), EnvError> {
  let malformed = |token: &str, reason: &str| EnvError::MalformedEntry {
    variable: variable.to_string(),
    token: token.to_string(),
    reason: reason.to_string(),
  };
  let record = |kind: MutationKind, args: Vec<String>, token: &str| {
    Mutation::new(kind, args).map_err(|e| malformed(token, &e.to_string()))
  };

  match rule {
    Suffix::PrependPath(target) => {
      for element in value.split(':').filter(|e| !e.is_empty()) {
        out.push(record(
          MutationKind::PrependPath,
          vec![target.to_string(), element.to_string()],
          element,
        )?);
      }
    }
    Suffix::ModuleUse => {
      for element in value.split_whitespace() {
        out.push(record(MutationKind::ModuleUse, vec![element.to_string()], element)?);
      }
    }
    Suffix::ModuleFiles => {
      for element in value.split_whitespace() {
        out.push(record(MutationKind::ModuleLoad, vec![element.to_string()], element)?);
      }
    }
    Suffix::SourceFiles => {
      for element in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let args: Vec<String> = element.split_whitespace().map(str::to_string).collect();
        if args.len() < 2 {
          return Err(malformed(element, "expected 'shell script [args...]'"));
        }
        out.push(record(MutationKind::SourceSh, args, element)?);
      }
    }
    Suffix::Exports | Suffix::Aliases | Suffix::RemovePaths => {
      let kind = match rule {
        Suffix::Exports => MutationKind::Setenv,
        Suffix::Aliases => MutationKind::SetAlias,
        _ => MutationKind::RemovePath,
      };
      for token in value.split_whitespace() {
        let (key, raw) = token
          .split_once('=')
          .ok_or_else(|| malformed(token, "expected 'name=value'"))?;
        if key.is_empty() {
          return Err(malformed(token, "empty name"));
        }
        let value = if kind == MutationKind::SetAlias { unquote(raw) } else { raw };
        out.push(record(kind, vec![key.to_string(), value.to_string()], token)?);
      }
    }
  }

  Ok(())
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
  for quote in ['"', '\''] {
    if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
      return &value[1..value.len() - 1];
    }
  }
  value
}
