//! quillstate CLI entry point
//!
//! Parses arguments, dispatches to the command, reports a failure as one
//! JSON error line and exits non-zero. All logic lives in the cli module.

use quillstate::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code(), &e.to_string());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
