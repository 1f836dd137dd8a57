/// Application name, used as the default module category and in generated headers.
pub const APP_NAME: &str = "venvmod";

/// Directory holding modulefiles, relative to the virtual environment root.
pub const MODULEFILES_DIR: &str = "etc/modulefiles";
