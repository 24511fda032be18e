//! Ledger counters
//!
//! Counters only, monotonic, reset on process start. Relaxed atomics: the
//! values are exact once the ledger is idle, which is when they are read.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::core::{DeliverResult, Effect};

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    checks: AtomicU64,
    transitions_delivered: AtomicU64,
    transitions_rejected: AtomicU64,
    tasks_scheduled: AtomicU64,
    tasks_cancelled: AtomicU64,
    tasks_fired: AtomicU64,
    tasks_failed: AtomicU64,
    records_written: AtomicU64,
    records_deleted: AtomicU64,
    journal_records: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_checks(&self) {
        self.checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.transitions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tasks_fired(&self) {
        self.tasks_fired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tasks_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_journal_records(&self) {
        self.journal_records.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a committed Deliver and everything it did
    pub fn record_delivery(&self, res: &DeliverResult) {
        self.transitions_delivered.fetch_add(1, Ordering::Relaxed);
        match res.effect {
            Effect::Created | Effect::Updated => {
                self.records_written.fetch_add(1, Ordering::Relaxed);
            }
            Effect::Deleted => {
                self.records_deleted.fetch_add(1, Ordering::Relaxed);
            }
            Effect::Unchanged => {}
        }
        if res.scheduled.is_some() {
            self.tasks_scheduled.fetch_add(1, Ordering::Relaxed);
        }
        if res.cancelled.is_some() {
            self.tasks_cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            checks: self.checks.load(Ordering::Relaxed),
            transitions_delivered: self.transitions_delivered.load(Ordering::Relaxed),
            transitions_rejected: self.transitions_rejected.load(Ordering::Relaxed),
            tasks_scheduled: self.tasks_scheduled.load(Ordering::Relaxed),
            tasks_cancelled: self.tasks_cancelled.load(Ordering::Relaxed),
            tasks_fired: self.tasks_fired.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            records_deleted: self.records_deleted.load(Ordering::Relaxed),
            journal_records: self.journal_records.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub checks: u64,
    pub transitions_delivered: u64,
    pub transitions_rejected: u64,
    pub tasks_scheduled: u64,
    pub tasks_cancelled: u64,
    pub tasks_fired: u64,
    pub tasks_failed: u64,
    pub records_written: u64,
    pub records_deleted: u64,
    pub journal_records: u64,
}
