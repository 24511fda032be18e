//! Store-backed task scheduler
//!
//! Tasks are kept in the ledger store itself, so scheduling and
//! cancellation commit or roll back together with the transition that
//! requested them.
//!
//! ```text
//! _crontask:<id BE64>                    -> JSON Task
//! _cronqueue:<run_at BE64><id BE64>      -> (empty)
//! _s._crontask                           -> last assigned id
//! ```
//!
//! Cancel is a point lookup by handle; the queue is only scanned by the
//! executor looking for due work.

use crate::errors::{LedgerError, LedgerResult};
use crate::handlers::Msg;
use crate::model::UnixTime;
use crate::storage::KvStore;

use super::task::{Task, TaskId};
use super::Scheduler;

const TASK_PREFIX: &[u8] = b"_crontask:";
const QUEUE_PREFIX: &[u8] = b"_cronqueue:";
const SEQUENCE_KEY: &[u8] = b"_s._crontask";

/// Scheduler persisting tasks in the ledger store
#[derive(Debug, Default, Clone, Copy)]
pub struct StoreScheduler;

impl StoreScheduler {
    pub fn new() -> Self {
        Self
    }

    fn task_key(id: TaskId) -> Vec<u8> {
        let mut key = TASK_PREFIX.to_vec();
        key.extend_from_slice(&id.to_key());
        key
    }

    fn queue_key(run_at: UnixTime, id: TaskId) -> LedgerResult<Vec<u8>> {
        let mut key = QUEUE_PREFIX.to_vec();
        key.extend_from_slice(&run_at_bytes(run_at)?);
        key.extend_from_slice(&id.to_key());
        Ok(key)
    }

    fn next_id(store: &mut dyn KvStore) -> LedgerResult<TaskId> {
        let last = match store.get(SEQUENCE_KEY) {
            Some(raw) => {
                let bytes: [u8; 8] = raw.as_slice().try_into().map_err(|_| {
                    LedgerError::consistency("task sequence is not 8 bytes")
                })?;
                u64::from_be_bytes(bytes)
            }
            None => 0,
        };
        let next = last + 1;
        store.set(SEQUENCE_KEY.to_vec(), next.to_be_bytes().to_vec());
        Ok(TaskId::new(next))
    }

    /// Look up a live task
    pub fn get(&self, store: &dyn KvStore, task_id: TaskId) -> LedgerResult<Option<Task>> {
        match store.get(&Self::task_key(task_id)) {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Remove a task from the store and return it; `None` if not live
    pub fn take(&self, store: &mut dyn KvStore, task_id: TaskId) -> LedgerResult<Option<Task>> {
        let Some(task) = self.get(&*store, task_id)? else {
            return Ok(None);
        };
        store.delete(&Self::task_key(task_id));
        store.delete(&Self::queue_key(task.run_at, task_id)?);
        Ok(Some(task))
    }

    /// Up to `limit` tasks with `run_at <= now`, earliest first
    pub fn due(&self, store: &dyn KvStore, now: UnixTime, limit: usize) -> LedgerResult<Vec<(TaskId, Task)>> {
        if now.as_secs() < 0 {
            return Ok(Vec::new());
        }
        let mut end = QUEUE_PREFIX.to_vec();
        end.extend_from_slice(&run_at_bytes(now.add_secs(1))?);

        let mut due = Vec::new();
        for (key, _) in store.range(QUEUE_PREFIX, Some(&end)).into_iter().take(limit) {
            let id_bytes: [u8; 8] = key[key.len() - 8..].try_into().map_err(|_| {
                LedgerError::consistency("malformed task queue key")
            })?;
            let task_id = TaskId::new(u64::from_be_bytes(id_bytes));
            let task = self.get(store, task_id)?.ok_or_else(|| {
                LedgerError::consistency(format!("queued {} has no task record", task_id))
            })?;
            due.push((task_id, task));
        }
        Ok(due)
    }

    /// Number of live tasks
    pub fn pending(&self, store: &dyn KvStore) -> usize {
        crate::storage::scan_prefix(store, QUEUE_PREFIX).len()
    }
}

fn run_at_bytes(run_at: UnixTime) -> LedgerResult<[u8; 8]> {
    let secs = run_at.as_secs();
    if secs < 0 {
        return Err(LedgerError::validation(format!(
            "cannot schedule at negative time {}",
            secs
        )));
    }
    Ok((secs as u64).to_be_bytes())
}

impl Scheduler for StoreScheduler {
    fn schedule(&self, store: &mut dyn KvStore, run_at: UnixTime, msg: &Msg) -> LedgerResult<TaskId> {
        run_at_bytes(run_at)?;
        let task_id = Self::next_id(store)?;
        let task = Task {
            run_at,
            msg: msg.clone(),
        };
        store.set(Self::task_key(task_id), serde_json::to_vec(&task)?);
        store.set(Self::queue_key(run_at, task_id)?, Vec::new());
        Ok(task_id)
    }

    fn cancel(&self, store: &mut dyn KvStore, task_id: TaskId) -> LedgerResult<()> {
        match self.take(store, task_id)? {
            Some(_) => Ok(()),
            None => Err(LedgerError::not_found(format!("{} is not scheduled", task_id))),
        }
    }
}
