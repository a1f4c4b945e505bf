use crate::collector::Collection;
use crate::error::{ErrorKind, TreecatError};
use crate::extract::FileReadResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// A per-file failure kept for the statistics block and the error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(path: impl Into<PathBuf>, error: &TreecatError) -> Self {
        Self {
            path: path.into(),
            kind: error.kind(),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// `<rfc3339> | <path>: <message>`
    pub fn log_line(&self) -> String {
        format!(
            "{} | {}: {}",
            self.timestamp.to_rfc3339(),
            self.path.display(),
            self.message
        )
    }
}

/// Counters for one scan. Only the orchestrator mutates them.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatistics {
    pub directories_scanned: u64,
    pub files_processed: u64,
    pub files_matched: u64,
    pub matches_found: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub errors: Vec<ErrorRecord>,
}

impl ScanStatistics {
    pub fn start() -> Self {
        Self {
            directories_scanned: 0,
            files_processed: 0,
            files_matched: 0,
            matches_found: 0,
            started_at: Utc::now(),
            finished_at: None,
            errors: Vec::new(),
        }
    }

    pub fn record_collection(&mut self, collection: &Collection) {
        self.directories_scanned += collection.directories_scanned;
        self.files_processed += collection.files_processed;
        self.files_matched += collection.files.len() as u64;
    }

    pub fn record_file(&mut self, result: &FileReadResult) {
        self.matches_found += result.keyword_matches() as u64;
        if let Some(error) = result.error() {
            self.errors.push(ErrorRecord::new(&result.path, error));
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Seconds between start and finish (or now, if still running).
    pub fn elapsed_secs(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Body of the statistics block.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Directories scanned: {}", self.directories_scanned),
            format!("Files processed:     {}", self.files_processed),
            format!("Files matched:       {}", self.files_matched),
            format!("Keyword matches:     {}", self.matches_found),
            format!("Errors encountered:  {}", self.error_count()),
            format!("Processing time:     {:.2} seconds", self.elapsed_secs()),
        ]
    }
}
