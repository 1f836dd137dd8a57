//! CLI integration tests.

mod appli_tests;
mod command_tests;
mod common;
mod init_tests;
mod show_tests;
