//! Name normalization rules.
//!
//! Modules and environment variables use two different spellings of the
//! same name: module files are lowercase with dashes, environment variable
//! prefixes are uppercase with underscores.

/// Standard module name: lowercase, `_` replaced by `-`.
pub fn std_name(name: &str) -> String {
  name.to_lowercase().replace('_', "-")
}

/// Environment variable prefix: uppercase, `-` and `.` replaced by `_`.
pub fn env_prefix(name: &str) -> String {
  name.to_uppercase().replace(['-', '.'], "_")
}

/// Module name for an application of the given virtual environment.
///
/// An application named like the environment itself refers to the global module.
pub fn module_name(venv_name: &str, appli: Option<&str>) -> String {
  match appli {
    Some(appli) if !appli.is_empty() && std_name(appli) != std_name(venv_name) => {
      std_name(&format!("{}-{}", venv_name, appli))
    }
    _ => std_name(venv_name),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn std_name_lowercases_and_dashes() {
    assert_eq!(std_name("My_Env"), "my-env");
    assert_eq!(std_name("Ap-p_Li.1"), "ap-p-li.1");
  }

  #[test]
  fn env_prefix_uppercases_and_underscores() {
    assert_eq!(env_prefix("my-env.2"), "MY_ENV_2");
    assert_eq!(env_prefix("Ap-p_Li.1"), "AP_P_LI_1");
  }

  #[test]
  fn module_name_for_root_and_appli() {
    assert_eq!(module_name("Venv_1", None), "venv-1");
    assert_eq!(module_name("Venv_1", Some("")), "venv-1");
    assert_eq!(module_name("Venv_1", Some("venv-1")), "venv-1");
    assert_eq!(module_name("Venv_1", Some("Solver")), "venv-1-solver");
  }
}
