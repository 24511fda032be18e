//! Stored record envelope
//!
//! Buckets persist `Record` values keyed by `RecordId`. Index builders see
//! records through `Object`, whose value is `None` for deletion bookkeeping.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::article::Article;
use super::blog::Blog;
use super::user::User;
use crate::errors::{LedgerError, LedgerResult};

/// Sequential record identifier; 0 is never assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub fn new(seq: u64) -> Self {
        RecordId(seq)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }

    /// Big-endian key bytes; lexicographic order equals numeric order
    pub fn to_key(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_key(raw: &[u8]) -> LedgerResult<Self> {
        let bytes: [u8; 8] = raw.try_into().map_err(|_| {
            LedgerError::consistency(format!("record key must be 8 bytes, got {}", raw.len()))
        })?;
        Ok(RecordId(u64::from_be_bytes(bytes)))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity type stored in a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    Blog,
    Article,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::User => "user",
            RecordKind::Blog => "blog",
            RecordKind::Article => "article",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any stored entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    User(User),
    Blog(Blog),
    Article(Article),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::User(_) => RecordKind::User,
            Record::Blog(_) => RecordKind::Blog,
            Record::Article(_) => RecordKind::Article,
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        match self {
            Record::User(u) => u.validate(),
            Record::Blog(b) => b.validate(),
            Record::Article(a) => a.validate(),
        }
    }

    pub fn into_user(self) -> LedgerResult<User> {
        match self {
            Record::User(u) => Ok(u),
            other => Err(mismatch(RecordKind::User, other.kind())),
        }
    }

    pub fn into_blog(self) -> LedgerResult<Blog> {
        match self {
            Record::Blog(b) => Ok(b),
            other => Err(mismatch(RecordKind::Blog, other.kind())),
        }
    }

    pub fn into_article(self) -> LedgerResult<Article> {
        match self {
            Record::Article(a) => Ok(a),
            other => Err(mismatch(RecordKind::Article, other.kind())),
        }
    }
}

fn mismatch(expected: RecordKind, got: RecordKind) -> LedgerError {
    LedgerError::consistency(format!("expected {}, got {}", expected, got))
}

/// A record as seen by index builders
#[derive(Debug, Clone, Copy)]
pub struct Object<'a> {
    pub id: RecordId,
    pub value: Option<&'a Record>,
}

impl<'a> Object<'a> {
    pub fn new(id: RecordId, value: &'a Record) -> Self {
        Self { id, value: Some(value) }
    }

    /// An object without payload; index builders yield no entry for it
    pub fn empty(id: RecordId) -> Self {
        Self { id, value: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnixTime;

    #[test]
    fn test_key_order_matches_numeric_order() {
        let a = RecordId::new(2).to_key();
        let b = RecordId::new(256).to_key();
        assert!(a < b);
        assert_eq!(RecordId::from_key(&b).unwrap(), RecordId::new(256));
    }

    #[test]
    fn test_short_key_is_consistency_error() {
        let err = RecordId::from_key(&[1, 2, 3]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_into_wrong_kind_is_consistency_error() {
        let record = Record::User(User {
            username: "someone".to_string(),
            bio: None,
            registered_at: UnixTime::from_secs(10),
        });
        assert!(record.clone().into_user().is_ok());
        assert!(record.into_blog().unwrap_err().is_fatal());
    }
}
