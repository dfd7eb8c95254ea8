//! Command handlers for the `luna` CLI.
//!
//! Each submodule implements one command. Handlers return the process exit
//! code instead of exiting, so they can be driven from tests.

mod check;
mod explain;

pub use check::{check_paths, parse_check_args, run_check, CheckArgs, CheckReport};
pub use explain::explain_error;
