//! Field format rules shared by messages and stored records

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{LedgerError, LedgerResult};

const USERNAME_PATTERN: &str = r"^[a-zA-Z0-9_.-]{4,16}$";
const BIO_PATTERN: &str = r"^[a-zA-Z0-9_ ]{4,200}$";
const TITLE_PATTERN: &str = r"^[a-zA-Z0-9$@!%*?&#'^;-_. +]{4,32}$";
const BODY_PATTERN: &str = r"^[a-zA-Z0-9$@!%*?&#'^;-_. +]{4,1000}$";

fn matches(cell: &'static OnceLock<Regex>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).unwrap_or_else(|e| panic!("bad pattern {}: {}", pattern, e)))
        .is_match(value)
}

pub fn valid_username(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    matches(&RE, USERNAME_PATTERN, value)
}

pub fn valid_bio(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    matches(&RE, BIO_PATTERN, value)
}

/// Blog and article titles
pub fn valid_title(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    matches(&RE, TITLE_PATTERN, value)
}

/// Blog descriptions and article content
pub fn valid_body(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    matches(&RE, BODY_PATTERN, value)
}

/// Collects per-field failures and reports them together.
///
/// The resulting error carries the first failing field; the message lists
/// every failure in the order they were recorded.
#[derive(Debug, Default)]
pub struct FieldErrors {
    failures: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field` when `ok` is false
    pub fn check(&mut self, field: &'static str, ok: bool, reason: &str) {
        if !ok {
            self.failures.push((field, reason.to_string()));
        }
    }

    /// Record the error of a nested validation, if any
    pub fn append(&mut self, field: &'static str, result: LedgerResult<()>) {
        if let Err(e) = result {
            self.failures.push((field, e.message().to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn finish(self) -> LedgerResult<()> {
        let Some((first, _)) = self.failures.first() else {
            return Ok(());
        };
        let message = self
            .failures
            .iter()
            .map(|(field, reason)| format!("{}: {}", field, reason))
            .collect::<Vec<_>>()
            .join("; ");
        Err(LedgerError::invalid_field(*first, message))
    }
}
