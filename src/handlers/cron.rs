//! System-originated article deletion
//!
//! Registered on the system route set only; the scheduler re-delivers the
//! `DeleteArticle` message stored with a task here. No ownership check:
//! the owner authorized the deletion when scheduling it.

use crate::core::{CheckResult, Context, DeliverResult, Handler};
use crate::errors::{LedgerError, LedgerResult};
use crate::scheduler::TaskId;
use crate::storage::KvStore;

use super::buckets::ArticleBucket;
use super::msg::{DeleteArticleMsg, Msg, DELETE_ARTICLE_PATH};
use super::{wrong_msg, DELETE_ARTICLE_COST};

pub struct CronDeleteArticleHandler {
    articles: ArticleBucket,
}

impl CronDeleteArticleHandler {
    pub fn new() -> Self {
        Self {
            articles: ArticleBucket::new(),
        }
    }

    fn validate<'m>(&self, ctx: &Context, msg: &'m Msg) -> LedgerResult<(&'m DeleteArticleMsg, TaskId)> {
        let Msg::DeleteArticle(msg) = msg else {
            return Err(wrong_msg(DELETE_ARTICLE_PATH, msg));
        };
        let task = ctx
            .caller
            .firing_task()
            .ok_or_else(|| LedgerError::unauthorized("scheduled deletion can only be fired by the scheduler"))?;
        msg.validate()?;
        Ok((msg, task))
    }
}

impl Default for CronDeleteArticleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for CronDeleteArticleHandler {
    fn check(&self, ctx: &Context, _store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult> {
        self.validate(ctx, msg)?;
        Ok(CheckResult {
            cost: DELETE_ARTICLE_COST,
        })
    }

    /// Deletes the article only while it still points at the firing task.
    /// An article already gone, or one whose deletion was cancelled, is a
    /// successful no-op.
    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult> {
        let (msg, task) = self.validate(ctx, msg)?;

        let Some(article) = self.articles.get(&*store, msg.article_id)? else {
            return Ok(DeliverResult::unchanged());
        };
        if article.delete_task_id != Some(task) {
            return Ok(DeliverResult::unchanged());
        }

        self.articles.delete(store, msg.article_id)?;
        Ok(DeliverResult::deleted(msg.article_id))
    }
}
