//! Index error types
//!
//! Error codes:
//! - QUILL_INDEX_TYPE_MISMATCH (FATAL)
//! - QUILL_INDEX_NEGATIVE_TIME (FATAL)
//! - QUILL_INDEX_DRIFT (FATAL)
//!
//! Every index error means a caller passed something the index could never
//! legitimately see. They surface as consistency errors and abort the
//! mutation instead of writing a wrong entry.

use std::fmt;

use crate::errors::{LedgerError, Severity};

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Indexer received a record of the wrong type
    TypeMismatch,
    /// Negative creation time would break big-endian ordering
    NegativeTime,
    /// Stored index entry disagrees with the primary record
    Drift,
}

impl IndexErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::TypeMismatch => "QUILL_INDEX_TYPE_MISMATCH",
            IndexErrorCode::NegativeTime => "QUILL_INDEX_NEGATIVE_TIME",
            IndexErrorCode::Drift => "QUILL_INDEX_DRIFT",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
}

impl IndexError {
    pub fn type_mismatch(expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Self {
            code: IndexErrorCode::TypeMismatch,
            message: format!("expected {}, got {}", expected, got),
        }
    }

    pub fn negative_time(created_at: i64) -> Self {
        Self {
            code: IndexErrorCode::NegativeTime,
            message: format!("cannot index negative creation time {}", created_at),
        }
    }

    pub fn drift(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::Drift,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for IndexError {}

impl From<IndexError> for LedgerError {
    fn from(e: IndexError) -> Self {
        LedgerError::consistency(format!("{}: {}", e.code, e.message))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
