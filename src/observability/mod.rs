//! Observability
//!
//! Structured JSON logging of ledger events to stderr and in-process counters.
//!
//! # Principles
//!
//! 1. Observing never changes ledger state
//! 2. Log writes are synchronous and never fail a transition
//! 3. Output is deterministic for identical inputs

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{LogLevel, Logger};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event at its default level
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::emit(event, fields);
}
