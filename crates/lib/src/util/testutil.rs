//! Test utilities for venvmod-lib.
//!
//! Builds throwaway virtual environments with a realistic `bin/activate`.

use std::fs;
use std::path::{Path, PathBuf};

/// `bin/activate` as written by `python -m venv`, with `__VENV__` standing in
/// for the environment path.
pub const ACTIVATE_TEMPLATE: &str = r#"# This file must be used with "source bin/activate" *from bash*
# you cannot run it directly

deactivate () {
    # reset old environment variables
    if [ -n "${_OLD_VIRTUAL_PATH:-}" ] ; then
        PATH="${_OLD_VIRTUAL_PATH:-}"
        export PATH
        unset _OLD_VIRTUAL_PATH
    fi
    if [ -n "${_OLD_VIRTUAL_PYTHONHOME:-}" ] ; then
        PYTHONHOME="${_OLD_VIRTUAL_PYTHONHOME:-}"
        export PYTHONHOME
        unset _OLD_VIRTUAL_PYTHONHOME
    fi

    # Call hash to forget past commands. Without forgetting
    # past commands the $PATH changes we made may not be respected
    hash -r 2> /dev/null

    if [ -n "${_OLD_VIRTUAL_PS1:-}" ] ; then
        PS1="${_OLD_VIRTUAL_PS1:-}"
        export PS1
        unset _OLD_VIRTUAL_PS1
    fi

    unset VIRTUAL_ENV
    unset VIRTUAL_ENV_PROMPT
    if [ ! "${1:-}" = "nondestructive" ] ; then
    # Self destruct!
        unset -f deactivate
    fi
}

# unset irrelevant variables
deactivate nondestructive

VIRTUAL_ENV="__VENV__"
export VIRTUAL_ENV

_OLD_VIRTUAL_PATH="$PATH"
PATH="$VIRTUAL_ENV/bin:$PATH"
export PATH

if [ -z "${VIRTUAL_ENV_DISABLE_PROMPT:-}" ] ; then
    _OLD_VIRTUAL_PS1="${PS1:-}"
    PS1="(venv) ${PS1:-}"
    export PS1
    VIRTUAL_ENV_PROMPT="(venv) "
    export VIRTUAL_ENV_PROMPT
fi

hash -r 2> /dev/null
"#;

/// Activate script content for a venv at `venv`.
pub fn activate_script(venv: &Path) -> String {
  ACTIVATE_TEMPLATE.replace("__VENV__", &venv.to_string_lossy())
}

/// Create a fake virtual environment named `name` under `parent`.
pub fn fake_venv(parent: &Path, name: &str) -> PathBuf {
  let venv = parent.join(name);
  fs::create_dir_all(venv.join("bin")).unwrap();
  fs::write(venv.join("bin").join("activate"), activate_script(&venv)).unwrap();
  venv
}
