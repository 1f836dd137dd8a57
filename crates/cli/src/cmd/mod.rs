mod appli;
mod command;
mod initialize;
mod read_env;
mod show;
mod test_import;

pub use appli::{cmd_add_appli, cmd_rm_appli};
pub use command::cmd_command;
pub use initialize::{cmd_deinitialize, cmd_initialize};
pub use read_env::cmd_read_env;
pub use show::cmd_show;
pub use test_import::cmd_test_import;
