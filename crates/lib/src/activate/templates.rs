//! Shell snippets inserted into `bin/activate`.
//!
//! `{indent}`, `{module}`, `{module_dir}` and `{init}` are substituted by the
//! patcher; paths arrive already shell-quoted.

/// First line of every inserted block.
pub const BLOCK_BEGIN: &str = "# >>> venvmod >>>";

/// Last line of every inserted block.
pub const BLOCK_END: &str = "# <<< venvmod <<<";

/// Marker comment near the top of a patched script.
pub const HEADER_LINE: &str = "# This file is generated from venvmod from regular venv or virtualenv file.";

/// Recorded in the closing block when the unpatched script had no final newline.
pub const NO_FINAL_NEWLINE: &str = "# venvmod: no newline at end of file";

/// Sources the module system's shell init script.
pub const SOURCE_INIT: &str = "{indent}. {init}\n";

/// Defined before `deactivate`; returns the first failing unload status.
pub const TEST_DEACTIVATE_STATUS: &str = r#"{indent}_test_deactivate_status () {
{indent}    _venvmod_status="${module_unload_status:-0} ${module_unuse_status:-0}"
{indent}    unset module_unload_status module_unuse_status
{indent}    unset -f _test_deactivate_status
{indent}    for _venvmod_code in $_venvmod_status ; do
{indent}        if [ "$_venvmod_code" -gt 0 ] ; then
{indent}            unset _venvmod_status
{indent}            return "$_venvmod_code"
{indent}        fi
{indent}    done
{indent}    unset _venvmod_status _venvmod_code
{indent}}
"#;

/// Inside `deactivate`, right after `unset VIRTUAL_ENV`.
pub const UNLOAD_MODULES: &str = r#"{indent}# Unload non-Python dependencies
{indent}module unload {module}
{indent}module_unload_status=$?
{indent}module unuse {module_dir}
{indent}module_unuse_status=$?
"#;

/// Inside `deactivate`, right after `unset -f deactivate`.
pub const RETURN_DEACTIVATE_STATUS: &str = r#"{indent}_test_deactivate_status
{indent}return $?
"#;

/// Right after the top-level `deactivate nondestructive`.
pub const LOAD_MODULES: &str = r#"{indent}# Load non-Python dependencies
{indent}module use {module_dir}
{indent}module_use_status=$?
{indent}module load {module}
{indent}module_load_status=$?
"#;

/// Appended at the end; makes sourcing `activate` return the module status.
pub const TEST_ACTIVATE_STATUS: &str = r#"_test_activate_status () {
    _venvmod_status="${module_use_status:-0} ${module_load_status:-0}"
    unset module_use_status module_load_status
    unset -f _test_activate_status
    for _venvmod_code in $_venvmod_status ; do
        if [ "$_venvmod_code" -gt 0 ] ; then
            unset _venvmod_status
            return "$_venvmod_code"
        fi
    done
    unset _venvmod_status _venvmod_code
}
_test_activate_status
"#;
