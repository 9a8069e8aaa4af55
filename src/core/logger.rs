//! Pluggable log sinks for scheduler events.
//!
//! The scheduler reports every step through a [`LogSink`]. The default
//! [`TracingSink`] forwards into `tracing`; [`NoopSink`] silences the scheduler
//! entirely; [`InMemorySink`] keeps a bounded buffer for tests and diagnostics.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;
use crate::util::serde::JobId;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Internal invariant violations.
    Error,
    /// Recoverable anomalies such as an attempt timing out.
    Warn,
    /// Notable lifecycle events.
    Info,
    /// Per-job scheduling steps.
    Debug,
    /// Fine-grained bookkeeping.
    Verbose,
}

/// One structured log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// Rendered message.
    pub message: String,
    /// Job the entry refers to.
    pub job_id: Option<JobId>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Log sink abstraction.
pub trait LogSink: Send + Sync {
    /// Record a log entry.
    fn log(&self, entry: LogEntry);
}

impl<F> LogSink for F
where
    F: Fn(LogEntry) + Send + Sync,
{
    fn log(&self, entry: LogEntry) {
        (self)(entry);
    }
}

/// Forwards entries to `tracing`. `Verbose` maps to `trace!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, entry: LogEntry) {
        let job_id = entry.job_id;
        match entry.level {
            LogLevel::Error => tracing::error!(job_id, "{}", entry.message),
            LogLevel::Warn => tracing::warn!(job_id, "{}", entry.message),
            LogLevel::Info => tracing::info!(job_id, "{}", entry.message),
            LogLevel::Debug => tracing::debug!(job_id, "{}", entry.message),
            LogLevel::Verbose => tracing::trace!(job_id, "{}", entry.message),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _entry: LogEntry) {}
}

/// In-memory sink for testing and dev. Oldest entries are evicted once full.
#[derive(Debug)]
pub struct InMemorySink {
    entries: Mutex<VecDeque<LogEntry>>,
    max_entries: usize,
}

impl InMemorySink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_entries.min(1024))),
            max_entries,
        }
    }

    /// Retrieve a snapshot of stored entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Entries at exactly `level`.
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing has been recorded (or everything was evicted).
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl LogSink for InMemorySink {
    fn log(&self, entry: LogEntry) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

/// Helper to build a log entry stamped with the current time.
pub fn build_log_entry(
    level: LogLevel,
    message: impl Into<String>,
    job_id: Option<JobId>,
) -> LogEntry {
    LogEntry {
        level,
        message: message.into(),
        job_id,
        created_at_ms: now_ms(),
    }
}
