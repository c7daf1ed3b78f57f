//! Splitting monthly PGN blobs into game records and reading their headers

use crate::errors::SyncError;
use crate::models::{GameFileKey, GameHeaders, GameRecord};

/// Two blank lines between games
pub const RECORD_SEPARATOR: &str = "\n\n\n";

/// Extension of materialized game files
pub const GAME_FILE_EXTENSION: &str = "md";

/// Split a monthly blob into game records.
///
/// Line breaks at either end of a partition are dropped and blank partitions
/// (e.g. after the final separator) are discarded, so re-splitting an
/// extracted record returns it unchanged.
pub fn split_records(blob: &str) -> Vec<GameRecord> {
    blob.split(RECORD_SEPARATOR)
        .map(|part| part.trim_matches(|c| c == '\n' || c == '\r'))
        .filter(|part| !part.trim().is_empty())
        .map(GameRecord::new)
        .collect()
}

/// Collect `[Key "value"]` tag pairs from a record.
///
/// Lines that are not tag pairs (movetext, comments) are ignored. When a key
/// repeats, the first occurrence wins.
pub fn parse_headers(record: &GameRecord) -> GameHeaders {
    let mut headers = GameHeaders::new();
    for line in record.text().lines() {
        if let Some((key, value)) = parse_tag_line(line) {
            headers.entry(key.to_string()).or_insert(value);
        }
    }
    headers
}

fn parse_tag_line(line: &str) -> Option<(&str, String)> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (key, rest) = inner.split_once(|c: char| c.is_whitespace())?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let quoted = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((key, unescape(quoted)))
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl GameFileKey {
    pub const REQUIRED_FIELDS: [&'static str; 4] = ["White", "Black", "UTCDate", "UTCTime"];

    pub fn from_headers(headers: &GameHeaders) -> Result<Self, SyncError> {
        let field = |name: &'static str| -> Result<String, SyncError> {
            headers
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(SyncError::MissingRequiredField { field: name })
        };

        Ok(GameFileKey {
            white: field("White")?,
            black: field("Black")?,
            utc_date: field("UTCDate")?,
            utc_time: field("UTCTime")?,
        })
    }

    pub fn from_record(record: &GameRecord) -> Result<Self, SyncError> {
        Self::from_headers(&parse_headers(record))
    }

    /// `<White>-<Black> <UTCDate dashed> <UTCTime>.md`
    pub fn file_name(&self) -> String {
        format!(
            "{}-{} {} {}.{}",
            path_safe(&self.white),
            path_safe(&self.black),
            path_safe(&self.utc_date.replace('.', "-")),
            path_safe(&self.utc_time),
            GAME_FILE_EXTENSION
        )
    }
}

// Header values must never add a directory level.
fn path_safe(value: &str) -> String {
    value.replace(['/', '\\'], "_")
}
