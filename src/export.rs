//! CSV export.
//!
//! Serializes the session log into a BOM-prefixed CSV payload and pushes it
//! through a download sink, then clears the log. The payload is bit-exact
//! for spreadsheet compatibility:
//!
//! ```text
//! <UTF-8 BOM>日時,人数
//! 2024/01/15/10/30/45,3
//! ```
//!
//! Reading the log and clearing it happen back to back with no suspension
//! between them, so a record appended by a still-armed iteration lands either
//! wholly before the export (and is included) or wholly after (and starts the
//! next session's log). There is no third interleaving.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::error::HeadcountError;
use crate::session::{LogRecord, SessionLog};

/// UTF-8 byte-order mark, so common spreadsheet tools pick the right
/// character set.
pub const UTF8_BOM: &str = "\u{feff}";

/// Fixed CSV header: "timestamp,count" in the deployment's language.
pub const CSV_HEADER: &str = "日時,人数";

/// File-download capability. Fire-and-forget from the page's point of view;
/// sinks here may still fail (disk full, unwritable directory) and that
/// failure leaves the log untouched.
pub trait DownloadSink {
    fn download(&mut self, content: &[u8], filename: &str) -> Result<()>;
}

impl<S: DownloadSink> DownloadSink for Rc<RefCell<S>> {
    fn download(&mut self, content: &[u8], filename: &str) -> Result<()> {
        self.borrow_mut().download(content, filename)
    }
}

/// Build the CSV payload for a set of records.
pub fn csv_payload(records: &[LogRecord]) -> Vec<u8> {
    let mut payload = String::with_capacity(
        UTF8_BOM.len() + CSV_HEADER.len() + 1 + records.len() * 24,
    );
    payload.push_str(UTF8_BOM);
    payload.push_str(CSV_HEADER);
    payload.push('\n');
    for record in records {
        payload.push_str(&record.timestamp);
        payload.push(',');
        payload.push_str(&record.count.to_string());
        payload.push('\n');
    }
    payload.into_bytes()
}

/// Export filename for an instant: ISO-8601 UTC, colons replaced with
/// hyphens, truncated to whole seconds.
pub fn export_filename(at: &DateTime<Utc>) -> String {
    format!("count_log_{}.csv", at.format("%Y-%m-%dT%H-%M-%S"))
}

/// Receipt for a successful export.
#[derive(Clone, Debug)]
pub struct ExportReceipt {
    pub filename: String,
    pub records_exported: usize,
}

/// Serializes the session log and delivers it through a download sink.
pub struct CsvExporter {
    sink: Box<dyn DownloadSink>,
}

impl CsvExporter {
    pub fn new(sink: Box<dyn DownloadSink>) -> Self {
        Self { sink }
    }

    /// Export the log.
    ///
    /// Empty log: `EmptyExport`, nothing downloaded, log untouched.
    /// Sink failure: `Export`, log untouched.
    /// Success: the log is cleared completely before returning.
    pub fn export(&mut self, log: &mut SessionLog) -> Result<ExportReceipt, HeadcountError> {
        if log.is_empty() {
            return Err(HeadcountError::EmptyExport);
        }

        let payload = csv_payload(log.records());
        let filename = export_filename(&Utc::now());
        self.sink
            .download(&payload, &filename)
            .map_err(|e| HeadcountError::Export(format!("{:#}", e)))?;

        let records_exported = log.len();
        log.clear();
        log::info!("exported {} records to {}", records_exported, filename);

        Ok(ExportReceipt {
            filename,
            records_exported,
        })
    }
}

// ----------------------------------------------------------------------------
// Sinks
// ----------------------------------------------------------------------------

/// Sink that writes downloads into a directory.
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn download(&mut self, content: &[u8], filename: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output directory {}", self.dir.display()))?;
        let path = self.dir.join(filename);
        std::fs::write(&path, content)
            .with_context(|| format!("write export file {}", path.display()))?;
        Ok(())
    }
}

/// Sink that keeps downloads in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryDownloadSink {
    downloads: Vec<(String, Vec<u8>)>,
}

impl MemoryDownloadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> &[(String, Vec<u8>)] {
        &self.downloads
    }
}

impl DownloadSink for MemoryDownloadSink {
    fn download(&mut self, content: &[u8], filename: &str) -> Result<()> {
        self.downloads.push((filename.to_string(), content.to_vec()));
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use chrono::TimeZone;

    use super::*;

    struct FailingSink;

    impl DownloadSink for FailingSink {
        fn download(&mut self, _content: &[u8], _filename: &str) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    fn single_record_log() -> SessionLog {
        let mut log = SessionLog::new();
        log.append(LogRecord::new("2024/01/01/00/00/00", 2));
        log
    }

    #[test]
    fn payload_is_bit_exact() {
        let log = single_record_log();
        let payload = csv_payload(log.records());
        let expected: Vec<u8> = "\u{feff}日時,人数\n2024/01/01/00/00/00,2\n"
            .as_bytes()
            .to_vec();
        assert_eq!(payload, expected);
        assert_eq!(&payload[..3], [0xef, 0xbb, 0xbf]);
    }

    #[test]
    fn filename_matches_fixed_pattern() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 8, 7, 6).unwrap();
        assert_eq!(export_filename(&at), "count_log_2024-03-09T08-07-06.csv");
    }

    #[test]
    fn filename_clock_is_utc() {
        // toISOString() semantics: the instant rendered in UTC, regardless of
        // the host offset.
        let at = chrono::FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 8, 7, 6)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(export_filename(&at), "count_log_2024-03-08T23-07-06.csv");
    }

    #[test]
    fn empty_export_downloads_nothing_and_keeps_log() {
        let sink = Rc::new(RefCell::new(MemoryDownloadSink::new()));
        let mut exporter = CsvExporter::new(Box::new(sink.clone()));
        let mut log = SessionLog::new();

        let err = exporter.export(&mut log).expect_err("empty");
        assert!(matches!(err, HeadcountError::EmptyExport));
        assert!(sink.borrow().downloads().is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn successful_export_clears_the_log() {
        let sink = Rc::new(RefCell::new(MemoryDownloadSink::new()));
        let mut exporter = CsvExporter::new(Box::new(sink.clone()));
        let mut log = single_record_log();

        let receipt = exporter.export(&mut log).expect("export");
        assert_eq!(receipt.records_exported, 1);
        assert!(log.is_empty());

        let sink = sink.borrow();
        let (filename, content) = &sink.downloads()[0];
        assert_eq!(filename, &receipt.filename);
        assert_eq!(content, &csv_payload(&[LogRecord::new("2024/01/01/00/00/00", 2)]));
    }

    #[test]
    fn second_export_signals_empty() {
        let sink = Rc::new(RefCell::new(MemoryDownloadSink::new()));
        let mut exporter = CsvExporter::new(Box::new(sink.clone()));
        let mut log = single_record_log();

        exporter.export(&mut log).expect("first export");
        let err = exporter.export(&mut log).expect_err("second export");
        assert!(matches!(err, HeadcountError::EmptyExport));
        assert_eq!(sink.borrow().downloads().len(), 1);
    }

    #[test]
    fn sink_failure_leaves_log_untouched() {
        let mut exporter = CsvExporter::new(Box::new(FailingSink));
        let mut log = single_record_log();

        let err = exporter.export(&mut log).expect_err("sink failure");
        assert!(matches!(err, HeadcountError::Export(_)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn payload_round_trips_through_a_csv_parser() {
        let mut log = SessionLog::new();
        log.append(LogRecord::new("2024/01/15/10/30/45", 3));
        log.append(LogRecord::new("2024/01/15/10/30/46", 2));
        let payload = csv_payload(log.records());

        let text = String::from_utf8(payload).unwrap();
        let text = text.strip_prefix(UTF8_BOM).expect("BOM");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));

        let parsed: Vec<LogRecord> = lines
            .map(|line| {
                let (timestamp, count) = line.split_once(',').expect("two columns");
                LogRecord::new(timestamp, count.parse().expect("count"))
            })
            .collect();
        assert_eq!(parsed, log.records());
    }

    #[test]
    fn directory_sink_writes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = DirectoryDownloadSink::new(dir.path().join("exports"));

        sink.download(b"payload", "count_log_test.csv").expect("download");

        let written = std::fs::read(dir.path().join("exports/count_log_test.csv")).expect("read");
        assert_eq!(written, b"payload");
    }
}
