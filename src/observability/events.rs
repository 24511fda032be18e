//! Ledger lifecycle events

use std::fmt;

use super::logger::LogLevel;

/// Every event the ledger logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    ConfigLoaded,
    LedgerOpened,
    JournalReplayed,
    /// Journal damaged; the ledger refuses to open
    JournalCorrupted,
    JournalAppended,

    // Transitions
    TransitionChecked,
    TransitionDelivered,
    TransitionRejected,

    // Scheduler
    TaskScheduled,
    TaskCancelled,
    TaskFired,
    /// Fired task found nothing to do
    TaskSkipped,
    TaskFailed,
    TickCompleted,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::LedgerOpened => "LEDGER_OPENED",
            Event::JournalReplayed => "JOURNAL_REPLAYED",
            Event::JournalCorrupted => "JOURNAL_CORRUPTED",
            Event::JournalAppended => "JOURNAL_APPENDED",
            Event::TransitionChecked => "TRANSITION_CHECKED",
            Event::TransitionDelivered => "TRANSITION_DELIVERED",
            Event::TransitionRejected => "TRANSITION_REJECTED",
            Event::TaskScheduled => "TASK_SCHEDULED",
            Event::TaskCancelled => "TASK_CANCELLED",
            Event::TaskFired => "TASK_FIRED",
            Event::TaskSkipped => "TASK_SKIPPED",
            Event::TaskFailed => "TASK_FAILED",
            Event::TickCompleted => "TICK_COMPLETED",
        }
    }

    /// Default level for the event
    pub fn level(&self) -> LogLevel {
        match self {
            Event::JournalAppended | Event::TransitionChecked => LogLevel::Trace,
            Event::TransitionRejected | Event::TaskFailed => LogLevel::Warn,
            Event::JournalCorrupted => LogLevel::Fatal,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_upper_snake() {
        let events = [
            Event::ConfigLoaded,
            Event::LedgerOpened,
            Event::JournalReplayed,
            Event::JournalCorrupted,
            Event::JournalAppended,
            Event::TransitionChecked,
            Event::TransitionDelivered,
            Event::TransitionRejected,
            Event::TaskScheduled,
            Event::TaskCancelled,
            Event::TaskFired,
            Event::TaskSkipped,
            Event::TaskFailed,
            Event::TickCompleted,
        ];
        for event in events {
            assert!(event.as_str().chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_levels() {
        assert_eq!(Event::JournalCorrupted.level(), LogLevel::Fatal);
        assert_eq!(Event::TaskFailed.level(), LogLevel::Warn);
        assert_eq!(Event::TaskFired.level(), LogLevel::Info);
    }
}
