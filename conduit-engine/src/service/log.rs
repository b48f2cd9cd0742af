//! Log Service
//!
//! Filtering and plain-text export of the log collection.

use chrono::NaiveDate;
use conduit_core::domain::log::{LogEntry, LogType};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::Store;

/// Type filter plus case-insensitive search
///
/// An empty search matches everything. The search looks at the message,
/// the pipeline name and the details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub kind: Option<LogType>,
    pub search: String,
}

impl LogFilter {
    pub fn of_kind(kind: LogType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.kind.is_some_and(|kind| kind != entry.kind) {
            return false;
        }

        let needle = self.search.to_lowercase();
        entry.message.to_lowercase().contains(&needle)
            || entry.pipeline.to_lowercase().contains(&needle)
            || entry
                .details
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Entries of the store matching `filter`, newest first
pub fn filter_logs(store: &Store, filter: &LogFilter) -> Vec<LogEntry> {
    store
        .list_logs()
        .into_iter()
        .filter(|entry| filter.matches(entry))
        .collect()
}

/// Renders entries as `[timestamp] [TYPE] [pipeline] message`, with an
/// indented details line when present, separated by blank lines
pub fn export_logs(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let mut line = format!(
                "[{}] [{}] [{}] {}",
                entry.timestamp,
                entry.kind.as_str().to_uppercase(),
                entry.pipeline,
                entry.message
            );
            if let Some(details) = &entry.details {
                line.push_str("\n  Details: ");
                line.push_str(details);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("pipeline-logs-{}.txt", date.format("%Y-%m-%d"))
}

/// Writes the filtered export into `dir`, named after today's date
pub fn write_export(store: &Store, filter: &LogFilter, dir: &Path) -> Result<PathBuf> {
    let entries = filter_logs(store, filter);
    let path = dir.join(export_file_name(chrono::Local::now().date_naive()));

    std::fs::write(&path, export_logs(&entries))?;

    tracing::info!("Exported {} log entries to {}", entries.len(), path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filter_by_kind_and_search() {
        let store = seed::demo_store();

        let errors = filter_logs(&store, &LogFilter::of_kind(LogType::Error));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].pipeline, "data-pipeline-etl");

        // matches details only
        let legacy = filter_logs(&store, &LogFilter::default().with_search("LEGACY"));
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].kind, LogType::Warning);

        let none = filter_logs(
            &store,
            &LogFilter::of_kind(LogType::Success).with_search("analytics"),
        );
        assert!(none.is_empty());

        assert_eq!(filter_logs(&store, &LogFilter::default()).len(), 5);
    }

    #[test]
    fn test_export_format() {
        let entries = seed::demo_logs();
        let exported = export_logs(&entries[..2]);
        assert_eq!(
            exported,
            "[2024-11-04 14:23:45] [SUCCESS] [frontend-production] Build completed successfully\n  \
             Details: All tests passed. Deployed to production.\n\n\
             [2024-11-04 14:22:10] [INFO] [backend-api-deploy] Starting deployment process\n  \
             Details: Initiating deployment to staging environment"
        );

        let mut bare = entries[0].clone();
        bare.details = None;
        assert_eq!(
            export_logs(&[bare]),
            "[2024-11-04 14:23:45] [SUCCESS] [frontend-production] Build completed successfully"
        );
        assert_eq!(export_logs(&[]), "");
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 4).unwrap();
        assert_eq!(export_file_name(date), "pipeline-logs-2024-11-04.txt");
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let store = seed::demo_store();

        let path = write_export(&store, &LogFilter::of_kind(LogType::Error), dir.path()).unwrap();

        assert!(path.starts_with(dir.path()));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("[2024-11-04 14:15:33] [ERROR] [data-pipeline-etl]"));
    }

    #[test]
    fn test_write_export_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_export(&seed::demo_store(), &LogFilter::default(), &missing).unwrap_err();
        assert!(matches!(err, crate::EngineError::Export(_)));
    }
}
