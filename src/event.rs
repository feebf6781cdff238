//! Log events delivered to appenders

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::Level;

/// A single log event
///
/// Owned by the host. Appenders only ever see `&LogEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// When the event was produced
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Logger name (the `log` target)
    pub target: String,
    pub message: String,
    /// Name of the producing thread, if it has one
    pub thread: Option<String>,
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Diagnostic context, in insertion order
    pub context: IndexMap<String, String>,
}

impl LogEvent {
    /// Create an event stamped with the current time and thread
    pub fn new(level: Level, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            target: target.into(),
            message: message.into(),
            thread: std::thread::current().name().map(str::to_owned),
            module_path: None,
            file: None,
            line: None,
            context: IndexMap::new(),
        }
    }

    /// Replace the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a context entry
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl From<&log::Record<'_>> for LogEvent {
    fn from(record: &log::Record<'_>) -> Self {
        let mut event = LogEvent::new(record.level(), record.target(), record.args().to_string());
        event.module_path = record.module_path().map(str::to_owned);
        event.file = record.file().map(str::to_owned);
        event.line = record.line();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_event() {
        let event = LogEvent::new(Level::Info, "app", "hello");
        assert_eq!(event.level, Level::Info);
        assert_eq!(event.target, "app");
        assert_eq!(event.message, "hello");
        assert!(event.context.is_empty());
    }

    #[test]
    fn test_event_at_and_context() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 3, 12, 0, 0).unwrap();
        let event = LogEvent::new(Level::Warn, "app", "disk")
            .at(ts)
            .with_context("request_id", "r-1")
            .with_context("user", "ada");

        assert_eq!(event.timestamp, ts);
        let keys: Vec<&str> = event.context.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["request_id", "user"]);
    }

    #[test]
    fn test_event_from_record() {
        let record = log::Record::builder()
            .args(format_args!("value is 42"))
            .level(Level::Debug)
            .target("flog::test")
            .module_path(Some("flog::event"))
            .file(Some("src/event.rs"))
            .line(Some(7))
            .build();

        let event = LogEvent::from(&record);

        assert_eq!(event.level, Level::Debug);
        assert_eq!(event.target, "flog::test");
        assert_eq!(event.message, "value is 42");
        assert_eq!(event.module_path.as_deref(), Some("flog::event"));
        assert_eq!(event.line, Some(7));
    }
}
