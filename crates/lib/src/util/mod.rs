//! Shared utilities.
//!
//! Filesystem helpers used by every writer and test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
