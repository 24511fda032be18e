use crate::auth::require_owner;
use crate::core::{CheckResult, Context, DeliverResult, Handler};
use crate::errors::LedgerResult;
use crate::model::{Blog, RecordId};
use crate::storage::KvStore;

use super::buckets::BlogBucket;
use super::msg::{Msg, CHANGE_BLOG_OWNER_PATH, CREATE_BLOG_PATH};
use super::{wrong_msg, CHANGE_BLOG_OWNER_COST, CREATE_BLOG_COST};

/// Creates a blog owned by the signer
pub struct CreateBlogHandler {
    blogs: BlogBucket,
}

impl CreateBlogHandler {
    pub fn new() -> Self {
        Self {
            blogs: BlogBucket::new(),
        }
    }

    fn validate(&self, ctx: &Context, msg: &Msg) -> LedgerResult<Blog> {
        let Msg::CreateBlog(msg) = msg else {
            return Err(wrong_msg(CREATE_BLOG_PATH, msg));
        };
        msg.validate()?;
        let owner = ctx.caller.require_signer()?;

        Ok(Blog {
            owner,
            title: msg.title.clone(),
            description: msg.description.clone(),
            created_at: ctx.time,
        })
    }
}

impl Default for CreateBlogHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for CreateBlogHandler {
    fn check(&self, ctx: &Context, _store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult> {
        self.validate(ctx, msg)?;
        Ok(CheckResult {
            cost: CREATE_BLOG_COST,
        })
    }

    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult> {
        let blog = self.validate(ctx, msg)?;
        let id = self.blogs.create(store, blog)?;
        Ok(DeliverResult::created(id))
    }
}

/// Hands a blog to a new owner. Existing articles keep their owner.
pub struct ChangeBlogOwnerHandler {
    blogs: BlogBucket,
}

impl ChangeBlogOwnerHandler {
    pub fn new() -> Self {
        Self {
            blogs: BlogBucket::new(),
        }
    }

    fn validate(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<(RecordId, Blog)> {
        let Msg::ChangeBlogOwner(msg) = msg else {
            return Err(wrong_msg(CHANGE_BLOG_OWNER_PATH, msg));
        };
        let new_owner = msg.validate()?;

        let mut blog = self
            .blogs
            .must_get(store, msg.blog_id)
            .map_err(|e| e.context("cannot change blog owner"))?;
        require_owner(&ctx.caller, &blog.owner, "change the blog owner")?;

        blog.owner = new_owner;
        Ok((msg.blog_id, blog))
    }
}

impl Default for ChangeBlogOwnerHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ChangeBlogOwnerHandler {
    fn check(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult> {
        self.validate(ctx, store, msg)?;
        Ok(CheckResult {
            cost: CHANGE_BLOG_OWNER_COST,
        })
    }

    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult> {
        let (id, blog) = self.validate(ctx, &*store, msg)?;
        self.blogs.save(store, id, blog)?;
        Ok(DeliverResult::updated(id))
    }
}
