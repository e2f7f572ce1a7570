//! Session log.
//!
//! In-memory, append-only record of per-frame person counts:
//!
//! - `LogRecord`: one timestamped count sample
//! - `SessionLog`: ordered collection, appended by the sampling loop while
//!   analysis is active, cleared entirely by a successful export
//!
//! Timestamps are local time in the fixed `YYYY/MM/DD/HH/MM/SS` form; frame
//! cadence means duplicate-second timestamps are normal, and insertion order
//! is the authoritative ordering.

use chrono::{DateTime, Local};

/// One timestamped person-count sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Local time, `YYYY/MM/DD/HH/MM/SS`, zero-padded.
    pub timestamp: String,
    /// Persons visible in the analyzed frame.
    pub count: u32,
}

impl LogRecord {
    pub fn new(timestamp: impl Into<String>, count: u32) -> Self {
        Self {
            timestamp: timestamp.into(),
            count,
        }
    }

    /// Record for `count` at the current local time.
    pub fn now(count: u32) -> Self {
        Self::new(format_timestamp(&Local::now()), count)
    }
}

/// Render a timestamp in the log's fixed form.
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y/%m/%d/%H/%M/%S").to_string()
}

/// Ordered, append-only collection of log records for the current session.
///
/// Created empty; mutated only by the sampling loop (append) and the export
/// path (clear). Both run on the same cooperative thread, so no lock is
/// needed; export treats read-and-clear as one non-suspending step.
#[derive(Debug, Default)]
pub struct SessionLog {
    records: Vec<LogRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clear the log completely. Never partial.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
