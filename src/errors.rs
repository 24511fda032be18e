//! Ledger error types
//!
//! Error codes:
//! - QUILL_VALIDATION (ERROR)
//! - QUILL_UNAUTHORIZED (ERROR)
//! - QUILL_NOT_FOUND (ERROR)
//! - QUILL_STORAGE_IO (ERROR)
//! - QUILL_ENCODING (ERROR)
//! - QUILL_CONSISTENCY (FATAL)
//! - QUILL_DATA_CORRUPTION (FATAL)
//!
//! ERROR severity is reported to the caller verbatim and leaves state
//! untouched. FATAL severity means a caller bug or a damaged journal; the
//! transition is aborted and nothing is committed.

use std::fmt;

/// Severity levels for ledger errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, ledger continues
    Error,
    /// Defect or corruption, must not be papered over
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Ledger error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorCode {
    /// Malformed field or format mismatch
    Validation,
    /// Acting identity is not the required owner
    Unauthorized,
    /// Referenced record or task does not exist
    NotFound,
    /// Index builder or store received impossible input
    Consistency,
    /// Journal I/O failed
    StorageIo,
    /// Journal checksum or framing failure
    DataCorruption,
    /// Record or message could not be (de)serialized
    Encoding,
}

impl LedgerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerErrorCode::Validation => "QUILL_VALIDATION",
            LedgerErrorCode::Unauthorized => "QUILL_UNAUTHORIZED",
            LedgerErrorCode::NotFound => "QUILL_NOT_FOUND",
            LedgerErrorCode::Consistency => "QUILL_CONSISTENCY",
            LedgerErrorCode::StorageIo => "QUILL_STORAGE_IO",
            LedgerErrorCode::DataCorruption => "QUILL_DATA_CORRUPTION",
            LedgerErrorCode::Encoding => "QUILL_ENCODING",
        }
    }

    /// Returns the severity level for this code
    pub fn severity(&self) -> Severity {
        match self {
            LedgerErrorCode::Consistency | LedgerErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for LedgerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Ledger error with code, message and the offending field if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerError {
    code: LedgerErrorCode,
    message: String,
    field: Option<String>,
}

impl LedgerError {
    /// Create an error with an explicit code
    pub fn new(code: LedgerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Validation failure not tied to a single field
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::Validation, message)
    }

    /// Validation failure on a named field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::Validation,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Acting identity is not allowed to perform the operation
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::Unauthorized, message)
    }

    /// Referenced record or task is missing
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::NotFound, message)
    }

    /// Caller bug detected inside the store or index layer (FATAL)
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::Consistency, message)
    }

    /// Journal I/O failure
    pub fn storage_io(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::StorageIo, message)
    }

    /// Journal content is damaged (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::DataCorruption, message)
    }

    /// (De)serialization failure
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::Encoding, message)
    }

    /// Prefix the message with context, keeping code and field
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> LedgerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending field, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns whether this error must abort rather than be reported
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub fn is_not_found(&self) -> bool {
        self.code == LedgerErrorCode::NotFound
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == LedgerErrorCode::Unauthorized
    }

    pub fn is_validation(&self) -> bool {
        self.code == LedgerErrorCode::Validation
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for LedgerError {}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::encoding(e.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerErrorCode::Validation.code(), "QUILL_VALIDATION");
        assert_eq!(LedgerErrorCode::Unauthorized.code(), "QUILL_UNAUTHORIZED");
        assert_eq!(LedgerErrorCode::NotFound.code(), "QUILL_NOT_FOUND");
        assert_eq!(LedgerErrorCode::Consistency.code(), "QUILL_CONSISTENCY");
        assert_eq!(LedgerErrorCode::DataCorruption.code(), "QUILL_DATA_CORRUPTION");
    }

    #[test]
    fn test_only_consistency_and_corruption_are_fatal() {
        assert!(LedgerError::consistency("wrong record type").is_fatal());
        assert!(LedgerError::data_corruption("bad crc").is_fatal());
        assert!(!LedgerError::validation("bad title").is_fatal());
        assert!(!LedgerError::unauthorized("not owner").is_fatal());
        assert!(!LedgerError::not_found("no blog").is_fatal());
        assert!(!LedgerError::storage_io("disk full").is_fatal());
    }

    #[test]
    fn test_display_contains_field_and_severity() {
        let err = LedgerError::invalid_field("title", "does not match pattern");
        let display = format!("{}", err);
        assert!(display.contains("ERROR"));
        assert!(display.contains("QUILL_VALIDATION"));
        assert!(display.contains("field: title"));
    }

    #[test]
    fn test_context_keeps_code() {
        let err = LedgerError::not_found("article 7").context("cannot cancel task");
        assert!(err.is_not_found());
        assert_eq!(err.message(), "cannot cancel task: article 7");
    }
}
