use serde::{Deserialize, Serialize};

use super::address::Address;
use super::record::RecordId;
use super::time::UnixTime;
use super::validation::{valid_body, valid_title, FieldErrors};
use crate::errors::LedgerResult;
use crate::scheduler::TaskId;

/// An article posted under a blog.
///
/// `owner` is copied from the blog when the article is created and never
/// re-derived. `delete_task_id` is set exactly while a deletion task for
/// this article is live in the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub blog_id: RecordId,
    pub owner: Address,
    pub title: String,
    pub content: String,
    pub created_at: UnixTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_at: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_task_id: Option<TaskId>,
}

impl Article {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("blog_id", self.blog_id.is_assigned(), "must reference a blog");
        errs.check("title", valid_title(&self.title), "invalid title");
        errs.check("content", valid_body(&self.content), "invalid content");
        errs.append("created_at", self.created_at.validate());
        errs.check("created_at", !self.created_at.is_zero(), "must be set");
        if let Some(delete_at) = self.delete_at {
            errs.append("delete_at", delete_at.validate());
            errs.check("delete_at", !delete_at.is_zero(), "zero must be stored as unset");
        }
        errs.finish()
    }

    pub fn has_scheduled_deletion(&self) -> bool {
        self.delete_task_id.is_some()
    }
}
