//! CLI argument definitions using clap
//!
//! Commands:
//! - quillstate init --config <path>
//! - quillstate submit --config <path> [--check-only]
//! - quillstate tick --config <path> --now <time>
//! - quillstate query --config <path> --path <path> [--data <hex> | --id <n>] [--prefix]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// quillstate - deterministic blog ledger
#[derive(Parser, Debug)]
#[command(name = "quillstate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory with an empty journal
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./quill.json")]
        config: PathBuf,
    },

    /// Apply newline-delimited JSON transactions read from stdin
    Submit {
        /// Path to configuration file
        #[arg(long, default_value = "./quill.json")]
        config: PathBuf,

        /// Run Check only; nothing is committed
        #[arg(long)]
        check_only: bool,
    },

    /// Fire every task due at or before --now
    Tick {
        /// Path to configuration file
        #[arg(long, default_value = "./quill.json")]
        config: PathBuf,

        /// Unix seconds or RFC3339
        #[arg(long)]
        now: String,
    },

    /// Read-only lookup by primary key or index value
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./quill.json")]
        config: PathBuf,

        /// Query path, e.g. `articles` or `articles/blog`
        #[arg(long)]
        path: String,

        /// Key or index value, hex encoded
        #[arg(long, conflicts_with = "id")]
        data: Option<String>,

        /// Record id, shorthand for its 8-byte big-endian key
        #[arg(long)]
        id: Option<u64>,

        /// Match every key starting with the given value
        #[arg(long)]
        prefix: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_defaults() {
        let cli = Cli::try_parse_from(["quillstate", "submit"]).unwrap();
        match cli.command {
            Command::Submit { config, check_only } => {
                assert_eq!(config, PathBuf::from("./quill.json"));
                assert!(!check_only);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_query_data_and_id_conflict() {
        let res = Cli::try_parse_from([
            "quillstate", "query", "--path", "users", "--data", "00", "--id", "1",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_tick_requires_now() {
        assert!(Cli::try_parse_from(["quillstate", "tick"]).is_err());
    }
}
