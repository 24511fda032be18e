//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::errors::LedgerError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("data directory already initialized")]
    AlreadyInitialized,

    #[error("data directory not initialized, run 'quillstate init' first")]
    NotInitialized,
}

impl CliError {
    /// Stable code string, reported in error responses
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "QUILL_CLI_CONFIG_ERROR",
            CliError::Ledger(e) => e.code().code(),
            CliError::Io(_) | CliError::Json(_) => "QUILL_CLI_IO_ERROR",
            CliError::InvalidArgument(_) => "QUILL_CLI_INVALID_ARGUMENT",
            CliError::AlreadyInitialized => "QUILL_CLI_ALREADY_INITIALIZED",
            CliError::NotInitialized => "QUILL_CLI_NOT_INITIALIZED",
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_code_passes_through() {
        let err = CliError::from(LedgerError::not_found("article 7"));
        assert_eq!(err.code(), "QUILL_NOT_FOUND");
        assert!(err.to_string().contains("article 7"));
    }

    #[test]
    fn test_lifecycle_codes() {
        assert_eq!(CliError::AlreadyInitialized.code(), "QUILL_CLI_ALREADY_INITIALIZED");
        assert_eq!(CliError::NotInitialized.code(), "QUILL_CLI_NOT_INITIALIZED");
    }
}
