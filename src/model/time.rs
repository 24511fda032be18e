//! Transition timestamps
//!
//! Timestamps are whole seconds since the Unix epoch. Zero is reserved for
//! "unset" (for example, an article without a deletion deadline).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};

/// Seconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTime(i64);

impl UnixTime {
    /// The unset timestamp
    pub const ZERO: UnixTime = UnixTime(0);

    pub fn from_secs(secs: i64) -> Self {
        UnixTime(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns this time shifted by `secs` seconds, saturating on overflow
    pub fn add_secs(&self, secs: i64) -> Self {
        UnixTime(self.0.saturating_add(secs))
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        UnixTime(dt.timestamp())
    }

    /// Returns the calendar time, or None when out of chrono's range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// Validate that the timestamp is representable as a calendar time
    pub fn validate(&self) -> LedgerResult<()> {
        if self.to_datetime().is_none() {
            return Err(LedgerError::validation(format!(
                "timestamp {} is out of range",
                self.0
            )));
        }
        Ok(())
    }

    /// Parse either integer seconds or an RFC 3339 string
    pub fn parse(input: &str) -> LedgerResult<Self> {
        let trimmed = input.trim();
        if let Ok(secs) = trimmed.parse::<i64>() {
            return Ok(UnixTime(secs));
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| UnixTime(dt.timestamp()))
            .map_err(|e| LedgerError::validation(format!("invalid time '{}': {}", trimmed, e)))
    }

    /// Current wall-clock time; used only by the CLI, never inside a transition
    pub fn now() -> Self {
        UnixTime(Utc::now().timestamp())
    }
}

impl fmt::Display for UnixTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}
