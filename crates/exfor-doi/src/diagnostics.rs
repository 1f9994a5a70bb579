//! Per-record failure reporting.
//!
//! The batch driver reports every failed record through a [`DiagnosticsSink`]
//! rather than writing to a fixed log file. The binary uses [`RunLog`]; tests
//! use [`MemorySink`] and assert on the captured events.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};

/// What kind of failure an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The search request failed (status or transport).
    Retrieval,
    /// Anything else while processing the record.
    Unexpected,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retrieval => f.write_str("retrieval"),
            Self::Unexpected => f.write_str("unexpected"),
        }
    }
}

/// One failed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    /// Entry that failed.
    pub entry_id: String,
    /// Failure category written to the run log.
    pub kind: FailureKind,
    /// Full error chain.
    pub cause: String,
}

impl DiagnosticEvent {
    #[must_use]
    pub fn new(entry_id: impl Into<String>, kind: FailureKind, cause: impl Into<String>) -> Self {
        Self { entry_id: entry_id.into(), kind, cause: cause.into() }
    }
}

/// Destination for per-record failures.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Emits events as `tracing` errors only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        tracing::error!(entry = %event.entry_id, kind = %event.kind, cause = %event.cause, "Record failed");
    }
}

/// Run-scoped log file, truncated when opened, one line per failed record.
///
/// Every event is also forwarded to `tracing`.
pub struct RunLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl RunLog {
    /// Create (or truncate) the log file.
    pub fn create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| StoreError::io(&path, e))?;
        Ok(Self { path, writer: Mutex::new(BufWriter::new(file)) })
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticsSink for RunLog {
    fn record(&self, event: DiagnosticEvent) {
        TracingSink.record(event.clone());

        let line = format!(
            "{} ERROR: at ENTRY: {} [{}] {}\n",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            event.entry_id,
            event.kind,
            event.cause
        );

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        let mut result = writer.write_all(line.as_bytes());
        if result.is_ok() {
            result = writer.flush();
        }
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Could not write run log");
        }
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog").field("path", &self.path).finish()
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record(DiagnosticEvent::new("1", FailureKind::Retrieval, "503 Service Unavailable"));
        sink.record(DiagnosticEvent::new("2", FailureKind::Unexpected, "bad body"));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].entry_id, "1");
        assert_eq!(events[1].kind, FailureKind::Unexpected);
    }

    #[test]
    fn test_run_log_truncates_and_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doi_parsing.log");
        std::fs::write(&path, "stale line from an earlier run\n").unwrap();

        let log = RunLog::create(&path).unwrap();
        log.record(DiagnosticEvent::new("A0001", FailureKind::Retrieval, "500 Internal Server Error"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("ERROR: at ENTRY: A0001 [retrieval] 500 Internal Server Error"));
    }
}
