//! # Transition Handlers
//!
//! Check/Deliver pairs for every blog message, plus the route and query
//! registration the ledger wires them in with.
//!
//! ## Invariants
//! - Check and Deliver run the same `validate`; only Deliver writes
//! - Scheduling and cancellation happen only in Deliver
//! - `Article::delete_task_id` is `Some` exactly while its task is live
//! - The system deletion handler is reachable only through the system routes

mod article;
mod blog;
mod buckets;
mod cron;
mod msg;
mod user;

use std::sync::Arc;

pub use article::{CancelDeleteArticleTaskHandler, CreateArticleHandler, DeleteArticleHandler};
pub use blog::{ChangeBlogOwnerHandler, CreateBlogHandler};
pub use buckets::{ArticleBucket, BlogBucket, UserBucket, ARTICLE_BUCKET, BLOG_BUCKET, USER_BUCKET};
pub use cron::CronDeleteArticleHandler;
pub use msg::{
    CancelDeleteArticleTaskMsg, ChangeBlogOwnerMsg, CreateArticleMsg, CreateBlogMsg, CreateUserMsg,
    DeleteArticleMsg, Msg, CANCEL_DELETE_ARTICLE_TASK_PATH, CHANGE_BLOG_OWNER_PATH,
    CREATE_ARTICLE_PATH, CREATE_BLOG_PATH, CREATE_USER_PATH, DELETE_ARTICLE_PATH,
};
pub use user::CreateUserHandler;

use crate::core::{QueryRouter, Router};
use crate::errors::{LedgerError, LedgerResult};
use crate::scheduler::Scheduler;

pub const CREATE_USER_COST: i64 = 1;
pub const CREATE_BLOG_COST: i64 = 10;
pub const CHANGE_BLOG_OWNER_COST: i64 = 5;
pub const NEW_ARTICLE_COST: i64 = 1;
/// Characters per article cost unit
pub const ARTICLE_COST_UNIT: i64 = 1000;
pub const DELETE_ARTICLE_COST: i64 = 0;
pub const CANCEL_DELETE_COST: i64 = 0;

/// Register the externally reachable handlers
pub fn register_routes(router: &mut Router, scheduler: Arc<dyn Scheduler>) -> LedgerResult<()> {
    router.handle(CREATE_USER_PATH, Arc::new(CreateUserHandler::new()))?;
    router.handle(CREATE_BLOG_PATH, Arc::new(CreateBlogHandler::new()))?;
    router.handle(CHANGE_BLOG_OWNER_PATH, Arc::new(ChangeBlogOwnerHandler::new()))?;
    router.handle(CREATE_ARTICLE_PATH, Arc::new(CreateArticleHandler::new(scheduler.clone())))?;
    router.handle(DELETE_ARTICLE_PATH, Arc::new(DeleteArticleHandler::new(scheduler.clone())))?;
    router.handle(
        CANCEL_DELETE_ARTICLE_TASK_PATH,
        Arc::new(CancelDeleteArticleTaskHandler::new(scheduler)),
    )?;
    Ok(())
}

/// Register the handlers the scheduler fires; never exposed to callers
pub fn register_cron_routes(router: &mut Router) -> LedgerResult<()> {
    router.handle(DELETE_ARTICLE_PATH, Arc::new(CronDeleteArticleHandler::new()))
}

/// Expose the three buckets and their indexes for read-only lookup
pub fn register_query(queries: &mut QueryRouter) -> LedgerResult<()> {
    queries.register("users", UserBucket::new().into_bucket())?;
    queries.register("blogs", BlogBucket::new().into_bucket())?;
    queries.register("articles", ArticleBucket::new().into_bucket())?;
    Ok(())
}

/// A handler was routed a message of another path
fn wrong_msg(expected: &str, got: &Msg) -> LedgerError {
    LedgerError::consistency(format!(
        "handler for {} received {} message",
        expected,
        got.path()
    ))
}
