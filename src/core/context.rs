//! Transition context
//!
//! Carried into every Check and Deliver: the logical time of the transition
//! and who submitted it.

use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::handlers::Msg;
use crate::model::{Address, RecordId, UnixTime};
use crate::scheduler::TaskId;

/// Context of one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Logical transition time; monotonic across the ledger
    pub time: UnixTime,

    /// Submitter of the transition
    pub caller: Caller,
}

impl Context {
    pub fn new(time: UnixTime, caller: Caller) -> Self {
        Self { time, caller }
    }

    /// Context for a signed (or unsigned) external transaction
    pub fn signed(time: UnixTime, signer: Option<Address>) -> Self {
        Self::new(time, Caller::from_signer(signer))
    }

    /// Context for the scheduler firing `task`
    pub fn system(time: UnixTime, task: TaskId) -> Self {
        Self::new(time, Caller::System(task))
    }
}

/// An external transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub time: UnixTime,
    /// Verified acting identity, supplied by the authentication provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<Address>,
    pub msg: Msg,
}

impl Tx {
    pub fn new(time: UnixTime, signer: Option<Address>, msg: Msg) -> Self {
        Self { time, signer, msg }
    }

    pub fn context(&self) -> Context {
        Context::signed(self.time, self.signer)
    }
}

/// Outcome of Check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub cost: i64,
}

/// What a Deliver did to its primary record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Created,
    Updated,
    Deleted,
    #[default]
    Unchanged,
}

/// Outcome of Deliver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliverResult {
    /// Primary record touched by the transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    pub effect: Effect,

    /// Task registered by the transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<TaskId>,

    /// Task removed by the transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<TaskId>,
}

impl DeliverResult {
    pub fn created(id: RecordId) -> Self {
        Self {
            id: Some(id),
            effect: Effect::Created,
            ..Self::default()
        }
    }

    pub fn updated(id: RecordId) -> Self {
        Self {
            id: Some(id),
            effect: Effect::Updated,
            ..Self::default()
        }
    }

    pub fn deleted(id: RecordId) -> Self {
        Self {
            id: Some(id),
            effect: Effect::Deleted,
            ..Self::default()
        }
    }

    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn with_scheduled(mut self, task: Option<TaskId>) -> Self {
        self.scheduled = task;
        self
    }

    pub fn with_cancelled(mut self, task: Option<TaskId>) -> Self {
        self.cancelled = task;
        self
    }
}
