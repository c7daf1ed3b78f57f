use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::{ErrorKind, SyncError};

/// Identifier of one remote monthly archive, as listed by the archive index.
/// The trailing path segment encodes the month (`.../YYYY/MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveReference(String);

impl ArchiveReference {
    pub fn new(reference: impl Into<String>) -> Self {
        ArchiveReference(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (year, month) pair. Field order gives the lexicographic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatePair {
    pub year: i32,
    pub month: u32,
}

impl DatePair {
    pub fn new(year: i32, month: u32) -> Self {
        DatePair { year, month }
    }

    /// `YYYY/MM`, the form used in remote URLs
    pub fn url_segment(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }
}

impl fmt::Display for DatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Raw multi-game PGN text for one month
#[derive(Debug, Clone)]
pub struct MonthlyBlob {
    pub period: DatePair,
    pub text: String,
}

/// One game's text block as cut out of a monthly blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord(String);

impl GameRecord {
    pub fn new(text: impl Into<String>) -> Self {
        GameRecord(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

/// Header tag pairs of one game record
pub type GameHeaders = HashMap<String, String>;

/// Identity of a materialized game: drives the output file name and
/// de-duplication across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameFileKey {
    pub white: String,
    pub black: String,
    pub utc_date: String,
    pub utc_time: String,
}

/// What to do with an existing `pgn/<YYYY>-<MM>.pgn` file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonthlyBlobPolicy {
    /// Rewrite the month file on every run that includes the month
    #[default]
    Overwrite,
    /// Leave an existing month file untouched
    KeepExisting,
}

impl MonthlyBlobPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            MonthlyBlobPolicy::Overwrite => "overwrite",
            MonthlyBlobPolicy::KeepExisting => "keep",
        }
    }
}

impl std::str::FromStr for MonthlyBlobPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" | "always" => Ok(MonthlyBlobPolicy::Overwrite),
            "keep" | "keep-existing" | "skip" => Ok(MonthlyBlobPolicy::KeepExisting),
            other => Err(anyhow::anyhow!(
                "Unsupported blob policy: {}. Supported policies: overwrite, keep",
                other
            )),
        }
    }
}

/// Error counts per category
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorCounts {
    pub remote_unavailable: usize,
    pub malformed_archive_reference: usize,
    pub missing_required_field: usize,
    pub filesystem_failure: usize,
}

impl ErrorCounts {
    pub fn total(&self) -> usize {
        self.remote_unavailable
            + self.malformed_archive_reference
            + self.missing_required_field
            + self.filesystem_failure
    }

    pub fn get(&self, kind: ErrorKind) -> usize {
        match kind {
            ErrorKind::RemoteUnavailable => self.remote_unavailable,
            ErrorKind::MalformedArchiveReference => self.malformed_archive_reference,
            ErrorKind::MissingRequiredField => self.missing_required_field,
            ErrorKind::FilesystemFailure => self.filesystem_failure,
        }
    }

    fn bump(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::RemoteUnavailable => self.remote_unavailable += 1,
            ErrorKind::MalformedArchiveReference => self.malformed_archive_reference += 1,
            ErrorKind::MissingRequiredField => self.missing_required_field += 1,
            ErrorKind::FilesystemFailure => self.filesystem_failure += 1,
        }
    }
}

/// Outcome of one sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub archives_listed: usize,
    pub archives_included: usize,
    pub archives_excluded: usize,
    pub archives_processed: usize,
    pub blobs_written: usize,
    pub blobs_kept: usize,
    pub games_found: usize,
    pub games_materialized: usize,
    pub games_skipped: usize,
    pub errors: ErrorCounts,
    pub error_messages: Vec<String>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncSummary {
    pub fn new() -> Self {
        SyncSummary {
            archives_listed: 0,
            archives_included: 0,
            archives_excluded: 0,
            archives_processed: 0,
            blobs_written: 0,
            blobs_kept: 0,
            games_found: 0,
            games_materialized: 0,
            games_skipped: 0,
            errors: ErrorCounts::default(),
            error_messages: Vec::new(),
            cancelled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_error(&mut self, context: &str, error: &SyncError) {
        self.errors.bump(error.kind());
        self.error_messages.push(format!("{}: {}", context, error));
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

impl Default for SyncSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_pair_ordering_is_year_then_month() {
        assert!(DatePair::new(2023, 12) < DatePair::new(2024, 1));
        assert!(DatePair::new(2024, 5) < DatePair::new(2024, 6));
        assert_eq!(DatePair::new(2024, 6).to_string(), "2024-06");
        assert_eq!(DatePair::new(2024, 6).url_segment(), "2024/06");
    }

    #[test]
    fn test_blob_policy_parsing() {
        assert_eq!("overwrite".parse::<MonthlyBlobPolicy>().unwrap(), MonthlyBlobPolicy::Overwrite);
        assert_eq!("KEEP".parse::<MonthlyBlobPolicy>().unwrap(), MonthlyBlobPolicy::KeepExisting);
        assert!("sometimes".parse::<MonthlyBlobPolicy>().is_err());
    }

    #[test]
    fn test_summary_counts_errors_by_kind() {
        let mut summary = SyncSummary::new();
        summary.record_error("2024-06", &SyncError::MissingRequiredField { field: "White" });
        summary.record_error("2024-07", &SyncError::remote("http://x", "HTTP 500"));
        summary.record_error("game", &SyncError::MissingRequiredField { field: "UTCTime" });

        assert_eq!(summary.errors.get(ErrorKind::MissingRequiredField), 2);
        assert_eq!(summary.errors.remote_unavailable, 1);
        assert_eq!(summary.errors.total(), 3);
        assert_eq!(summary.error_messages.len(), 3);
        assert!(summary.error_messages[0].starts_with("2024-06: "));
    }
}
