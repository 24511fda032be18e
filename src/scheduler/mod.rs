//! # Task Scheduler Bridge
//!
//! Deferred execution of messages. A handler registers a message with
//! `schedule` during Deliver and stores the returned handle on its record;
//! `cancel` removes the task by handle. The executor (`Ledger::tick`)
//! re-delivers due messages through the system route set with
//! `Caller::System`.
//!
//! Both trait methods take `&mut dyn KvStore`, so they cannot be reached
//! from a Check, which only ever sees a shared store reference.

mod cron;
mod task;

pub use cron::StoreScheduler;
pub use task::{Task, TaskId, TaskOutcome};

use crate::errors::LedgerResult;
use crate::handlers::Msg;
use crate::model::UnixTime;
use crate::storage::KvStore;

/// Schedule/cancel contract used by transition handlers
pub trait Scheduler: Send + Sync {
    /// Register `msg` to run at or after `run_at`
    fn schedule(&self, store: &mut dyn KvStore, run_at: UnixTime, msg: &Msg) -> LedgerResult<TaskId>;

    /// Remove a live task; NotFound when the handle is not live
    fn cancel(&self, store: &mut dyn KvStore, task_id: TaskId) -> LedgerResult<()>;
}
