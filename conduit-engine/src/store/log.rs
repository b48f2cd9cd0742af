//! Log collection

use conduit_core::domain::log::LogEntry;
use conduit_core::dto::log::NewLogEntry;
use tracing::debug;

use super::{Store, lock, next_id};

/// Timestamp format for log entries
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Store {
    /// Appends a log entry stamped with the current local time
    pub fn add_log(&self, new: NewLogEntry) -> LogEntry {
        let timestamp = chrono::Local::now().format(LOG_TIMESTAMP_FORMAT).to_string();

        let mut logs = lock(&self.logs);
        let entry = LogEntry {
            id: next_id(logs.iter().map(|l| l.id)),
            timestamp,
            kind: new.kind,
            pipeline: new.pipeline,
            message: new.message,
            details: new.details,
        };
        logs.insert(0, entry.clone());

        debug!("Log added: [{}] {} ({})", entry.kind, entry.message, entry.pipeline);

        entry
    }

    /// Snapshot of all log entries, newest first
    pub fn list_logs(&self) -> Vec<LogEntry> {
        lock(&self.logs).clone()
    }

    pub fn log_count(&self) -> usize {
        lock(&self.logs).len()
    }

    /// Removes every log entry, returning how many were dropped
    pub fn clear_logs(&self) -> usize {
        let mut logs = lock(&self.logs);
        let cleared = logs.len();
        logs.clear();

        debug!("Cleared {} log entries", cleared);

        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::domain::log::LogType;

    #[test]
    fn test_add_log_assigns_id_and_timestamp() {
        let store = Store::new();
        let first = store.add_log(NewLogEntry::info("api", "started"));
        let second = store.add_log(NewLogEntry::success("api", "done").with_details("ok"));

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.kind, LogType::Success);
        assert_eq!(second.details.as_deref(), Some("ok"));
        assert!(
            chrono::NaiveDateTime::parse_from_str(&first.timestamp, LOG_TIMESTAMP_FORMAT).is_ok(),
            "unexpected timestamp {}",
            first.timestamp
        );

        let logs = store.list_logs();
        assert_eq!(logs[0].id, 2);
        assert_eq!(logs[1].id, 1);
    }

    #[test]
    fn test_clear_logs() {
        let store = Store::new();
        store.add_log(NewLogEntry::info("a", "one"));
        store.add_log(NewLogEntry::info("a", "two"));

        assert_eq!(store.clear_logs(), 2);
        assert_eq!(store.log_count(), 0);
        assert_eq!(store.add_log(NewLogEntry::info("a", "three")).id, 1);
    }
}
