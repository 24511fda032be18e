//! Transition messages
//!
//! Every message knows its routing path and validates its own shape. Shape
//! checks need no store access; lookups and ownership are the handler's job.

use serde::{Deserialize, Serialize};

use crate::errors::LedgerResult;
use crate::model::validation::{valid_bio, valid_body, valid_title, valid_username, FieldErrors};
use crate::model::{Address, RecordId, UnixTime};

pub const CREATE_USER_PATH: &str = "blog/create_user";
pub const CREATE_BLOG_PATH: &str = "blog/create_blog";
pub const CHANGE_BLOG_OWNER_PATH: &str = "blog/change_blog_owner";
pub const CREATE_ARTICLE_PATH: &str = "blog/create_article";
pub const DELETE_ARTICLE_PATH: &str = "blog/delete_article";
pub const CANCEL_DELETE_ARTICLE_TASK_PATH: &str = "blog/cancel_delete_article_task";

/// Every message the ledger accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    CreateUser(CreateUserMsg),
    CreateBlog(CreateBlogMsg),
    ChangeBlogOwner(ChangeBlogOwnerMsg),
    CreateArticle(CreateArticleMsg),
    DeleteArticle(DeleteArticleMsg),
    CancelDeleteArticleTask(CancelDeleteArticleTaskMsg),
}

impl Msg {
    /// Routing path
    pub fn path(&self) -> &'static str {
        match self {
            Msg::CreateUser(_) => CREATE_USER_PATH,
            Msg::CreateBlog(_) => CREATE_BLOG_PATH,
            Msg::ChangeBlogOwner(_) => CHANGE_BLOG_OWNER_PATH,
            Msg::CreateArticle(_) => CREATE_ARTICLE_PATH,
            Msg::DeleteArticle(_) => DELETE_ARTICLE_PATH,
            Msg::CancelDeleteArticleTask(_) => CANCEL_DELETE_ARTICLE_TASK_PATH,
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        match self {
            Msg::CreateUser(m) => m.validate(),
            Msg::CreateBlog(m) => m.validate(),
            Msg::ChangeBlogOwner(m) => m.validate().map(|_| ()),
            Msg::CreateArticle(m) => m.validate(),
            Msg::DeleteArticle(m) => m.validate(),
            Msg::CancelDeleteArticleTask(m) => m.validate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserMsg {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl CreateUserMsg {
    /// The bio, with an empty string read as absent
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref().filter(|b| !b.is_empty())
    }

    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("username", valid_username(&self.username), "invalid username");
        if let Some(bio) = self.bio() {
            errs.check("bio", valid_bio(bio), "invalid bio");
        }
        errs.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBlogMsg {
    pub title: String,
    pub description: String,
}

impl CreateBlogMsg {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("title", valid_title(&self.title), "invalid title");
        errs.check("description", valid_body(&self.description), "invalid description");
        errs.finish()
    }
}

/// Transfer a blog. `new_owner` is hex; a malformed value is a
/// validation failure of this message, not a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlogOwnerMsg {
    pub blog_id: RecordId,
    pub new_owner: String,
}

impl ChangeBlogOwnerMsg {
    /// Validates and returns the parsed new owner
    pub fn validate(&self) -> LedgerResult<Address> {
        let mut errs = FieldErrors::new();
        errs.check("blog_id", self.blog_id.is_assigned(), "must reference a blog");
        let parsed = Address::parse(&self.new_owner);
        if let Err(e) = &parsed {
            errs.check("new_owner", false, e.message());
        }
        errs.finish()?;
        parsed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateArticleMsg {
    pub blog_id: RecordId,
    pub title: String,
    pub content: String,
    /// Zero means no scheduled deletion
    #[serde(default, skip_serializing_if = "UnixTime::is_zero")]
    pub delete_at: UnixTime,
}

impl CreateArticleMsg {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("blog_id", self.blog_id.is_assigned(), "must reference a blog");
        errs.check("title", valid_title(&self.title), "invalid title");
        errs.check("content", valid_body(&self.content), "invalid content");
        if !self.delete_at.is_zero() {
            errs.append("delete_at", self.delete_at.validate());
        }
        errs.finish()
    }

    /// The deletion deadline, if one was requested
    pub fn deadline(&self) -> Option<UnixTime> {
        (!self.delete_at.is_zero()).then_some(self.delete_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteArticleMsg {
    pub article_id: RecordId,
}

impl DeleteArticleMsg {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("article_id", self.article_id.is_assigned(), "must reference an article");
        errs.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelDeleteArticleTaskMsg {
    pub article_id: RecordId,
}

impl CancelDeleteArticleTaskMsg {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errs = FieldErrors::new();
        errs.check("article_id", self.article_id.is_assigned(), "must reference an article");
        errs.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let msg = Msg::DeleteArticle(DeleteArticleMsg {
            article_id: RecordId::new(1),
        });
        assert_eq!(msg.path(), "blog/delete_article");
    }

    #[test]
    fn test_json_shape() {
        let raw = r#"{"type":"create_article","blog_id":1,"title":"a title","content":"some content"}"#;
        let msg: Msg = serde_json::from_str(raw).unwrap();
        match &msg {
            Msg::CreateArticle(m) => {
                assert!(m.delete_at.is_zero());
                assert_eq!(m.deadline(), None);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn test_empty_bio_is_absent() {
        let msg = CreateUserMsg {
            username: "Crpto0X".to_string(),
            bio: Some(String::new()),
        };
        assert_eq!(msg.bio(), None);
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn test_malformed_new_owner() {
        let msg = ChangeBlogOwnerMsg {
            blog_id: RecordId::new(1),
            new_owner: "not hex".to_string(),
        };
        let err = msg.validate().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("new_owner"));
    }

    #[test]
    fn test_unassigned_ids_rejected() {
        let err = DeleteArticleMsg {
            article_id: RecordId::new(0),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), Some("article_id"));

        let err = CreateArticleMsg {
            blog_id: RecordId::new(0),
            title: "ab".to_string(),
            content: "some content".to_string(),
            delete_at: UnixTime::ZERO,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), Some("blog_id"));
        assert!(err.message().contains("title"));
    }
}
