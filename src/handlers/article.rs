//! Owner-facing article handlers
//!
//! An article's `delete_task_id` is set in the same Deliver that schedules
//! its deletion and cleared in the same Deliver that cancels it, so the
//! field and the scheduler never disagree after a commit.

use std::sync::Arc;

use crate::auth::require_owner;
use crate::core::{CheckResult, Context, DeliverResult, Handler};
use crate::errors::{LedgerError, LedgerResult};
use crate::model::{Article, RecordId};
use crate::scheduler::Scheduler;
use crate::storage::KvStore;

use super::buckets::{ArticleBucket, BlogBucket};
use super::msg::{
    DeleteArticleMsg, Msg, CANCEL_DELETE_ARTICLE_TASK_PATH, CREATE_ARTICLE_PATH, DELETE_ARTICLE_PATH,
};
use super::{wrong_msg, ARTICLE_COST_UNIT, CANCEL_DELETE_COST, DELETE_ARTICLE_COST, NEW_ARTICLE_COST};

/// Posts an article under a blog, scheduling its deletion when asked
pub struct CreateArticleHandler {
    blogs: BlogBucket,
    articles: ArticleBucket,
    scheduler: Arc<dyn Scheduler>,
}

impl CreateArticleHandler {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            blogs: BlogBucket::new(),
            articles: ArticleBucket::new(),
            scheduler,
        }
    }

    fn validate(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<Article> {
        let Msg::CreateArticle(msg) = msg else {
            return Err(wrong_msg(CREATE_ARTICLE_PATH, msg));
        };
        msg.validate()?;

        let blog = self
            .blogs
            .must_get(store, msg.blog_id)
            .map_err(|e| e.context("cannot post article"))?;
        require_owner(&ctx.caller, &blog.owner, "post an article under this blog")?;

        if let Some(deadline) = msg.deadline() {
            if deadline <= ctx.time {
                return Err(LedgerError::invalid_field(
                    "delete_at",
                    format!("delete at {} is not after transition time {}", deadline, ctx.time),
                ));
            }
        }

        Ok(Article {
            blog_id: msg.blog_id,
            owner: blog.owner,
            title: msg.title.clone(),
            content: msg.content.clone(),
            created_at: ctx.time,
            delete_at: msg.deadline(),
            delete_task_id: None,
        })
    }
}

impl Handler for CreateArticleHandler {
    fn check(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult> {
        let article = self.validate(ctx, store, msg)?;
        // the first thousand characters are free
        let cost = article.content.len() as i64 * NEW_ARTICLE_COST / ARTICLE_COST_UNIT;
        Ok(CheckResult { cost })
    }

    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult> {
        let mut article = self.validate(ctx, &*store, msg)?;
        let id = self.articles.create(store, article.clone())?;

        let Some(deadline) = article.delete_at else {
            return Ok(DeliverResult::created(id));
        };
        let delete = Msg::DeleteArticle(DeleteArticleMsg { article_id: id });
        let task_id = self
            .scheduler
            .schedule(store, deadline, &delete)
            .map_err(|e| e.context(format!("cannot schedule deletion of article {}", id)))?;

        article.delete_task_id = Some(task_id);
        self.articles.save(store, id, article)?;
        Ok(DeliverResult::created(id).with_scheduled(Some(task_id)))
    }
}

/// Owner-initiated article deletion. A pending deletion task is cancelled
/// in the same transition.
pub struct DeleteArticleHandler {
    articles: ArticleBucket,
    scheduler: Arc<dyn Scheduler>,
}

impl DeleteArticleHandler {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            articles: ArticleBucket::new(),
            scheduler,
        }
    }

    fn validate(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<(RecordId, Article)> {
        let Msg::DeleteArticle(msg) = msg else {
            return Err(wrong_msg(DELETE_ARTICLE_PATH, msg));
        };
        msg.validate()?;

        let article = self
            .articles
            .must_get(store, msg.article_id)
            .map_err(|e| e.context("cannot delete article"))?;
        require_owner(&ctx.caller, &article.owner, "delete this article")?;
        Ok((msg.article_id, article))
    }
}

impl Handler for DeleteArticleHandler {
    fn check(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult> {
        self.validate(ctx, store, msg)?;
        Ok(CheckResult {
            cost: DELETE_ARTICLE_COST,
        })
    }

    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult> {
        let (id, article) = self.validate(ctx, &*store, msg)?;

        if let Some(task_id) = article.delete_task_id {
            self.scheduler
                .cancel(store, task_id)
                .map_err(|e| e.context(format!("cannot cancel deletion task of article {}", id)))?;
        }
        self.articles.delete(store, id)?;
        Ok(DeliverResult::deleted(id).with_cancelled(article.delete_task_id))
    }
}

/// Cancels an article's pending deletion; the article stays
pub struct CancelDeleteArticleTaskHandler {
    articles: ArticleBucket,
    scheduler: Arc<dyn Scheduler>,
}

impl CancelDeleteArticleTaskHandler {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            articles: ArticleBucket::new(),
            scheduler,
        }
    }

    fn validate(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<(RecordId, Article)> {
        let Msg::CancelDeleteArticleTask(msg) = msg else {
            return Err(wrong_msg(CANCEL_DELETE_ARTICLE_TASK_PATH, msg));
        };
        msg.validate()?;

        let article = self
            .articles
            .must_get(store, msg.article_id)
            .map_err(|e| e.context("cannot cancel deletion"))?;
        require_owner(&ctx.caller, &article.owner, "cancel this article's deletion")?;

        if !article.has_scheduled_deletion() {
            return Err(LedgerError::not_found(format!(
                "no scheduled deletion for article {}",
                msg.article_id
            )));
        }
        Ok((msg.article_id, article))
    }
}

impl Handler for CancelDeleteArticleTaskHandler {
    fn check(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult> {
        self.validate(ctx, store, msg)?;
        Ok(CheckResult {
            cost: CANCEL_DELETE_COST,
        })
    }

    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult> {
        let (id, mut article) = self.validate(ctx, &*store, msg)?;

        let task_id = article.delete_task_id.take();
        if let Some(task_id) = task_id {
            self.scheduler
                .cancel(store, task_id)
                .map_err(|e| e.context(format!("cannot cancel deletion task of article {}", id)))?;
        }
        self.articles.save(store, id, article)?;
        Ok(DeliverResult::updated(id).with_cancelled(task_id))
    }
}
