use serde::{Deserialize, Serialize};

use super::address::Address;
use super::time::UnixTime;
use super::validation::{valid_body, valid_title, FieldErrors};
use crate::errors::LedgerResult;

/// A blog owned by a single account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub owner: Address,
    pub title: String,
    pub description: String,
    pub created_at: UnixTime,
}

impl Blog {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("title", valid_title(&self.title), "invalid title");
        errs.check("description", valid_body(&self.description), "invalid description");
        errs.append("created_at", self.created_at.validate());
        errs.check("created_at", !self.created_at.is_zero(), "must be set");
        errs.finish()
    }

    /// Copy of this blog under a new owner; every other field is preserved
    pub fn with_owner(&self, owner: Address) -> Blog {
        Blog {
            owner,
            ..self.clone()
        }
    }
}
