//! CLI module for quillstate
//!
//! Provides command-line interface for:
//! - init: Create the data directory and journal
//! - submit: Apply transactions read from stdin
//! - tick: Fire due scheduled tasks
//! - query: One-shot read-only lookup

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, query, run, run_command, submit, tick};
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response};
