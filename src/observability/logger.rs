//! Structured JSON logger
//!
//! - One line per event, written synchronously
//! - `event` first, then `level`, then fields sorted by key
//! - Every level goes to stderr, unless a writer was installed with
//!   [`Logger::set_writer`]; stdout carries command output only

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use super::events::Event;

/// Log levels, least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide replacement for stderr
static WRITER: OnceLock<Mutex<Box<dyn Write + Send>>> = OnceLock::new();

/// Writes ledger events as JSON lines
pub struct Logger;

impl Logger {
    /// Log `event` at its default level
    pub fn emit(event: Event, fields: &[(&str, &str)]) {
        Self::log(event.level(), event, fields);
    }

    /// Log `event` at an explicit level
    pub fn log(level: LogLevel, event: Event, fields: &[(&str, &str)]) {
        match WRITER.get() {
            Some(writer) => {
                if let Ok(mut writer) = writer.lock() {
                    Self::log_to_writer(level, event, fields, &mut *writer);
                }
            }
            None => Self::log_to_stderr(level, event, fields),
        }
    }

    /// Send every later log line to `writer`. Only the first call takes
    /// effect; returns false when a writer was already installed.
    pub fn set_writer(writer: Box<dyn Write + Send>) -> bool {
        WRITER.set(Mutex::new(writer)).is_ok()
    }

    /// Write one line to `writer`; a failed write is dropped
    pub fn log_to_writer<W: Write + ?Sized>(level: LogLevel, event: Event, fields: &[(&str, &str)], writer: &mut W) {
        let line = format_line(level, event.as_str(), fields);
        // a failed log write must never fail a transition
        let _ = writer.write_all(line.as_bytes());
    }

    #[cfg(not(test))]
    fn log_to_stderr(level: LogLevel, event: Event, fields: &[(&str, &str)]) {
        Self::log_to_writer(level, event, fields, &mut std::io::stderr().lock());
    }

    // eprint! goes through the test harness capture
    #[cfg(test)]
    fn log_to_stderr(level: LogLevel, event: Event, fields: &[(&str, &str)]) {
        eprint!("{}", format_line(level, event.as_str(), fields));
    }
}

fn format_line(level: LogLevel, event: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(128);
    out.push_str("{\"event\":\"");
    escape_into(&mut out, event);
    out.push_str("\",\"level\":\"");
    out.push_str(level.as_str());
    out.push('"');

    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    for (key, value) in sorted {
        out.push_str(",\"");
        escape_into(&mut out, key);
        out.push_str("\":\"");
        escape_into(&mut out, value);
        out.push('"');
    }
    out.push_str("}\n");
    out
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
}

/// Render a log line without writing it
#[cfg(test)]
pub fn capture_log(level: LogLevel, event: Event, fields: &[(&str, &str)]) -> String {
    format_line(level, event.as_str(), fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_is_json_with_event_first() {
        let line = capture_log(LogLevel::Info, Event::TransitionDelivered, &[("path", "blog/create_user")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "TRANSITION_DELIVERED");
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["path"], "blog/create_user");
        assert!(line.starts_with("{\"event\""));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_fields_sorted() {
        let a = capture_log(LogLevel::Warn, Event::TaskFailed, &[("task", "1"), ("error", "x")]);
        let b = capture_log(LogLevel::Warn, Event::TaskFailed, &[("error", "x"), ("task", "1")]);
        assert_eq!(a, b);
        assert!(a.find("error").unwrap() < a.find("task").unwrap());
    }

    #[test]
    fn test_escaping() {
        let line = capture_log(
            LogLevel::Error,
            Event::TransitionRejected,
            &[("error", "bad \"title\"\n\tagain")],
        );
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["error"], "bad \"title\"\n\tagain");
    }

    #[test]
    fn test_log_to_writer_appends_lines() {
        let mut out = Vec::new();
        Logger::log_to_writer(LogLevel::Info, Event::TaskFired, &[("task", "task-01")], &mut out);
        Logger::log_to_writer(LogLevel::Trace, Event::JournalAppended, &[], &mut out);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("{\"event\":\"TASK_FIRED\""));
        assert!(lines[1].contains("\"level\":\"TRACE\""));
    }
}
