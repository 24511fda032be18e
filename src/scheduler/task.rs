//! Scheduled tasks

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handlers::Msg;
use crate::model::UnixTime;

/// Opaque handle of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn new(seq: u64) -> Self {
        TaskId(seq)
    }

    pub(crate) fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{:016x}", self.0)
    }
}

/// A message to re-deliver through the system routes at or after `run_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub run_at: UnixTime,
    pub msg: Msg,
}

/// Result of firing one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub run_at: UnixTime,
    pub path: &'static str,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
