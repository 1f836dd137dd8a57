//! venvmod-lib: environment modules for Python virtual environments
//!
//! This crate provides everything behind the `venvmod` commands:
//! - `module`: module descriptors, mutation records and modulefile rendering
//! - `environ`: the `<NAME>_*` environment variable convention
//! - `venv`: modulefile storage inside a virtual environment
//! - `activate`: the `bin/activate` hook
//! - `init`, `appli`: the operations, one per command
//! - `imports`: concurrent Python import checks

pub mod activate;
pub mod appli;
pub mod consts;
pub mod environ;
pub mod imports;
pub mod init;
pub mod module;
pub mod naming;
pub mod util;
pub mod venv;
