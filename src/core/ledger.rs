//! Transition engine
//!
//! The ledger applies transitions one at a time, in the order they are
//! submitted. Each Deliver and each fired task runs inside a `CacheWrap`;
//! its writes reach the journal and the store together or not at all.
//!
//! # Invariants
//!
//! - Check never writes: it only ever sees `&dyn KvStore`
//! - A failed Deliver leaves store, indexes and scheduler untouched
//! - Transition time never goes backwards
//! - Fired tasks run on the system routes only

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::errors::{LedgerError, LedgerResult};
use crate::handlers::{
    register_cron_routes, register_query, register_routes, ArticleBucket, BlogBucket, UserBucket,
};
use crate::model::{Address, Article, Blog, RecordId, UnixTime, User};
use crate::observability::{log_event, Event, LogLevel, Logger, MetricsRegistry, MetricsSnapshot};
use crate::scheduler::{StoreScheduler, Task, TaskId, TaskOutcome};
use crate::storage::{replay, Batch, CacheWrap, Journal, KvStore, MemStore};

use super::context::{CheckResult, Context, DeliverResult, Effect, Tx};
use super::query::{QueryMode, QueryModel, QueryRouter};
use super::router::Router;

/// Last applied transition time, i64 BE
const TIME_KEY: &[u8] = b"_meta.time";

const DEFAULT_MAX_TASKS_PER_TICK: usize = 256;

/// Result of one executor pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub now: UnixTime,
    pub fired: Vec<TaskOutcome>,
    /// Tasks still scheduled after the pass
    pub pending: usize,
}

pub struct Ledger {
    store: MemStore,
    journal: Option<Journal>,
    routes: Router,
    cron_routes: Router,
    queries: QueryRouter,
    scheduler: Arc<StoreScheduler>,
    users: UserBucket,
    blogs: BlogBucket,
    articles: ArticleBucket,
    metrics: MetricsRegistry,
    max_tasks_per_tick: usize,
}

impl Ledger {
    /// Volatile ledger without a journal
    pub fn in_memory() -> LedgerResult<Self> {
        Self::build(MemStore::new(), None, DEFAULT_MAX_TASKS_PER_TICK)
    }

    /// Open the ledger in `config.data_dir`, replaying its journal
    pub fn open(config: &Config) -> LedgerResult<Self> {
        let mut store = MemStore::new();
        let replayed = replay(&config.data_dir, &mut store).map_err(|e| {
            let err = LedgerError::from(e);
            if err.is_fatal() {
                log_event(Event::JournalCorrupted, &[("error", err.message())]);
            }
            err
        })?;
        log_event(Event::JournalReplayed, &[("records", &replayed.to_string())]);

        let journal = Journal::open(&config.data_dir, config.journal_fsync)?;
        let ledger = Self::build(store, Some(journal), config.max_tasks_per_tick)?;

        let data_dir = config.data_dir.display().to_string();
        let pending = ledger.pending_tasks().to_string();
        log_event(Event::LedgerOpened, &[("data_dir", &data_dir), ("pending_tasks", &pending)]);
        Ok(ledger)
    }

    fn build(store: MemStore, journal: Option<Journal>, max_tasks_per_tick: usize) -> LedgerResult<Self> {
        let scheduler = Arc::new(StoreScheduler::new());

        let mut routes = Router::new();
        register_routes(&mut routes, scheduler.clone())?;
        let mut cron_routes = Router::new();
        register_cron_routes(&mut cron_routes)?;
        let mut queries = QueryRouter::new();
        register_query(&mut queries)?;

        Ok(Self {
            store,
            journal,
            routes,
            cron_routes,
            queries,
            scheduler,
            users: UserBucket::new(),
            blogs: BlogBucket::new(),
            articles: ArticleBucket::new(),
            metrics: MetricsRegistry::new(),
            max_tasks_per_tick,
        })
    }

    /// Time of the last applied transition; zero for a fresh ledger
    pub fn last_time(&self) -> LedgerResult<UnixTime> {
        match self.store.get(TIME_KEY) {
            Some(raw) => {
                let bytes: [u8; 8] = raw
                    .as_slice()
                    .try_into()
                    .map_err(|_| LedgerError::consistency("stored transition time is not 8 bytes"))?;
                Ok(UnixTime::from_secs(i64::from_be_bytes(bytes)))
            }
            None => Ok(UnixTime::ZERO),
        }
    }

    fn ensure_time(&self, time: UnixTime) -> LedgerResult<()> {
        if time.as_secs() <= 0 {
            return Err(LedgerError::invalid_field("time", "transition time must be positive"));
        }
        time.validate().map_err(|e| LedgerError::invalid_field("time", e.message()))?;

        let last = self.last_time()?;
        if time < last {
            return Err(LedgerError::invalid_field(
                "time",
                format!("{} is before the last transition at {}", time, last),
            ));
        }
        Ok(())
    }

    /// Validate a transaction and price it without changing anything
    pub fn check(&self, tx: &Tx) -> LedgerResult<CheckResult> {
        self.metrics.increment_checks();
        let result = self.ensure_time(tx.time).and_then(|_| {
            let handler = self.routes.route(&tx.msg)?;
            handler.check(&tx.context(), &self.store, &tx.msg)
        });

        match &result {
            Ok(res) => Logger::emit(
                Event::TransitionChecked,
                &[("path", tx.msg.path()), ("cost", &res.cost.to_string())],
            ),
            Err(e) => self.log_rejection(tx.msg.path(), e),
        }
        result
    }

    /// Apply a transaction. On error nothing is committed.
    pub fn deliver(&mut self, tx: &Tx) -> LedgerResult<DeliverResult> {
        let result = self.try_deliver(tx);
        match &result {
            Ok(res) => {
                self.metrics.record_delivery(res);
                self.log_delivery(tx.msg.path(), res);
            }
            Err(e) => self.log_rejection(tx.msg.path(), e),
        }
        result
    }

    fn try_deliver(&mut self, tx: &Tx) -> LedgerResult<DeliverResult> {
        self.ensure_time(tx.time)?;
        let handler = self.routes.route(&tx.msg)?;

        let mut cache = CacheWrap::new(&self.store);
        let res = handler.deliver(&tx.context(), &mut cache, &tx.msg)?;
        write_time(&mut cache, tx.time);
        let batch = cache.into_batch();

        self.commit(batch)?;
        Ok(res)
    }

    /// Fire every task due at or before `now`, earliest first, up to the
    /// configured limit. Each task commits on its own.
    ///
    /// A task whose handler fails is dropped and reported; its writes are
    /// discarded. A fatal error stops the pass with the task still queued.
    pub fn tick(&mut self, now: UnixTime) -> LedgerResult<TickReport> {
        self.ensure_time(now)?;
        let due = self.scheduler.due(&self.store, now, self.max_tasks_per_tick)?;

        let mut fired = Vec::with_capacity(due.len());
        for (task_id, task) in due {
            fired.push(self.fire(now, task_id, task)?);
        }

        let report = TickReport {
            now,
            pending: self.pending_tasks(),
            fired,
        };
        Logger::emit(
            Event::TickCompleted,
            &[
                ("fired", &report.fired.len().to_string()),
                ("now", &now.to_string()),
                ("pending", &report.pending.to_string()),
            ],
        );
        Ok(report)
    }

    fn fire(&mut self, now: UnixTime, task_id: TaskId, task: Task) -> LedgerResult<TaskOutcome> {
        let ctx = Context::system(now, task_id);
        let path = task.msg.path();
        let task_label = task_id.to_string();
        self.metrics.increment_tasks_fired();

        let mut cache = CacheWrap::new(&self.store);
        self.scheduler.take(&mut cache, task_id)?;

        let attempt = self.cron_routes.route(&task.msg).and_then(|handler| {
            let mut inner = CacheWrap::new(&cache);
            let res = handler.deliver(&ctx, &mut inner, &task.msg)?;
            Ok((res, inner.into_batch()))
        });

        let error = match attempt {
            Ok((res, writes)) => {
                writes.apply(&mut cache);
                self.metrics.record_delivery(&res);
                let event = match res.effect {
                    Effect::Unchanged => Event::TaskSkipped,
                    _ => Event::TaskFired,
                };
                Logger::emit(event, &[("path", path), ("task", &task_label)]);
                None
            }
            Err(e) if e.is_fatal() => {
                Logger::log(
                    LogLevel::Error,
                    Event::TaskFailed,
                    &[("error", e.message()), ("path", path), ("task", &task_label)],
                );
                return Err(e);
            }
            Err(e) => {
                self.metrics.increment_tasks_failed();
                Logger::emit(
                    Event::TaskFailed,
                    &[("error", e.message()), ("path", path), ("task", &task_label)],
                );
                Some(e.to_string())
            }
        };

        write_time(&mut cache, now);
        let batch = cache.into_batch();
        self.commit(batch)?;

        Ok(TaskOutcome {
            task_id,
            run_at: task.run_at,
            path,
            succeeded: error.is_none(),
            error,
        })
    }

    fn commit(&mut self, batch: Batch) -> LedgerResult<()> {
        if let Some(journal) = self.journal.as_mut() {
            let offset = journal.append(&batch)?;
            self.metrics.increment_journal_records();
            Logger::emit(
                Event::JournalAppended,
                &[("offset", &offset.to_string()), ("ops", &batch.len().to_string())],
            );
        }
        batch.apply(&mut self.store);
        Ok(())
    }

    fn log_delivery(&self, path: &str, res: &DeliverResult) {
        let id = res.id.map(|id| id.to_string()).unwrap_or_default();
        Logger::emit(Event::TransitionDelivered, &[("id", &id), ("path", path)]);
        if let Some(task) = res.scheduled {
            Logger::emit(Event::TaskScheduled, &[("id", &id), ("task", &task.to_string())]);
        }
        if let Some(task) = res.cancelled {
            Logger::emit(Event::TaskCancelled, &[("id", &id), ("task", &task.to_string())]);
        }
    }

    fn log_rejection(&self, path: &str, err: &LedgerError) {
        self.metrics.increment_rejected();
        let level = if err.is_fatal() {
            LogLevel::Error
        } else {
            Event::TransitionRejected.level()
        };
        Logger::log(
            level,
            Event::TransitionRejected,
            &[("code", err.code().code()), ("error", err.message()), ("path", path)],
        );
    }

    /// Read-only lookup through the registered query paths
    pub fn query(&self, path: &str, data: &[u8], mode: QueryMode) -> LedgerResult<Vec<QueryModel>> {
        self.queries.query(&self.store, path, data, mode)
    }

    pub fn query_paths(&self) -> Vec<String> {
        self.queries.paths()
    }

    pub fn user(&self, id: RecordId) -> LedgerResult<Option<User>> {
        self.users.get(&self.store, id)
    }

    pub fn blog(&self, id: RecordId) -> LedgerResult<Option<Blog>> {
        self.blogs.get(&self.store, id)
    }

    pub fn article(&self, id: RecordId) -> LedgerResult<Option<Article>> {
        self.articles.get(&self.store, id)
    }

    /// Article lookup failing with NotFound when absent
    pub fn must_article(&self, id: RecordId) -> LedgerResult<Article> {
        self.articles.must_get(&self.store, id)
    }

    pub fn blogs_owned_by(&self, owner: &Address) -> LedgerResult<Vec<RecordId>> {
        self.blogs.by_owner(&self.store, owner)
    }

    /// Articles of a blog, ascending by id
    pub fn articles_of_blog(&self, blog: RecordId) -> LedgerResult<Vec<RecordId>> {
        self.articles.by_blog(&self.store, blog)
    }

    /// Articles of a blog, oldest first
    pub fn articles_by_time(&self, blog: RecordId) -> LedgerResult<Vec<RecordId>> {
        self.articles.by_blog_timed(&self.store, blog)
    }

    /// Articles of a blog created in `[from, to)`, oldest first
    pub fn articles_between(&self, blog: RecordId, from: UnixTime, to: UnixTime) -> LedgerResult<Vec<RecordId>> {
        self.articles.between(&self.store, blog, from.as_secs(), to.as_secs())
    }

    pub fn task(&self, task_id: TaskId) -> LedgerResult<Option<Task>> {
        self.scheduler.get(&self.store, task_id)
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending(&self.store)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Committed state, read-only
    pub fn store(&self) -> &dyn KvStore {
        &self.store
    }
}

fn write_time(store: &mut dyn KvStore, time: UnixTime) {
    store.set(TIME_KEY.to_vec(), time.as_secs().to_be_bytes().to_vec());
}
