//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains the execution logic for one subcommand plus its pure
//! helpers and tests.

pub mod compare;
pub mod compute;

pub use compare::{check_regression, diff_policy, execute_compare};
pub use compute::{check_threshold, execute_compute, project_root};
