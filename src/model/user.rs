use serde::{Deserialize, Serialize};

use super::time::UnixTime;
use super::validation::{valid_bio, valid_username, FieldErrors};
use crate::errors::LedgerResult;

/// A registered account profile. Users are never updated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub registered_at: UnixTime,
}

impl User {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("username", valid_username(&self.username), "invalid username");
        if let Some(bio) = &self.bio {
            errs.check("bio", valid_bio(bio), "invalid bio");
        }
        errs.append("registered_at", self.registered_at.validate());
        errs.check("registered_at", !self.registered_at.is_zero(), "must be set");
        errs.finish()
    }

    pub fn is_registered_after(&self, time: UnixTime) -> bool {
        self.registered_at > time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            username: "Crpto0X".to_string(),
            bio: Some("Best hacker in the universe".to_string()),
            registered_at: UnixTime::from_secs(1_700_000_000),
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(user().validate().is_ok());
    }

    #[test]
    fn test_missing_registration_time() {
        let mut u = user();
        u.registered_at = UnixTime::ZERO;
        let err = u.validate().unwrap_err();
        assert_eq!(err.field(), Some("registered_at"));
    }

    #[test]
    fn test_bad_bio() {
        let mut u = user();
        u.bio = Some("<script>".to_string());
        assert_eq!(u.validate().unwrap_err().field(), Some("bio"));
    }
}
