//! Archive date extraction and cutoff filtering

use crate::errors::SyncError;
use crate::models::{ArchiveReference, DatePair};

/// Length of the trailing `YYYY/MM` segment
const DATE_SEGMENT_LEN: usize = 7;

/// Parse the `YYYY/MM` trailer of an archive reference.
pub fn parse_archive_date(reference: &ArchiveReference) -> Result<DatePair, SyncError> {
    let raw = reference.as_str();
    if raw.len() < DATE_SEGMENT_LEN {
        return Err(SyncError::malformed(raw, "shorter than a YYYY/MM segment"));
    }

    let segment = raw
        .get(raw.len() - DATE_SEGMENT_LEN..)
        .ok_or_else(|| SyncError::malformed(raw, "trailing segment is not ASCII"))?;

    let (year, month) = segment
        .split_once('/')
        .ok_or_else(|| SyncError::malformed(raw, "trailing segment has no '/' separator"))?;

    if year.len() != 4 || month.len() != 2 {
        return Err(SyncError::malformed(raw, format!("unexpected date segment '{}'", segment)));
    }

    let year: i32 = parse_digits(year).ok_or_else(|| SyncError::malformed(raw, "year is not numeric"))?;
    let month: u32 = parse_digits(month).ok_or_else(|| SyncError::malformed(raw, "month is not numeric"))?;

    if !(1..=12).contains(&month) {
        return Err(SyncError::malformed(raw, format!("month {} out of range", month)));
    }

    Ok(DatePair::new(year, month))
}

// str::parse accepts a leading '+', which is not a digit.
fn parse_digits<T: std::str::FromStr>(token: &str) -> Option<T> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

/// On-or-after check against the cutoff. No cutoff includes everything.
pub fn satisfies_cutoff(date: DatePair, cutoff: Option<DatePair>) -> bool {
    match cutoff {
        None => true,
        Some(cutoff) => date.year > cutoff.year || (date.year == cutoff.year && date.month >= cutoff.month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(s: &str) -> ArchiveReference {
        ArchiveReference::new(s)
    }

    #[test]
    fn test_parses_trailing_segment_regardless_of_prefix() {
        let cases = [
            "https://api.chess.com/pub/player/hikaru/games/2024/06",
            "2024/06",
            "weird//prefix/with/2024/06",
            "x2024/06",
        ];
        for case in cases {
            assert_eq!(parse_archive_date(&reference(case)).unwrap(), DatePair::new(2024, 6), "{}", case);
        }
    }

    #[test]
    fn test_rejects_malformed_references() {
        let cases = ["", "2024/6", "https://api.chess.com/archives", "2024-06x", "20a4/06", "2024/+6", "2024/13", "2024/00"];
        for case in cases {
            let err = parse_archive_date(&reference(case)).unwrap_err();
            assert!(
                matches!(err, SyncError::MalformedArchiveReference { .. }),
                "{} should be malformed, got {:?}",
                case,
                err
            );
        }
    }

    #[test]
    fn test_cutoff_scenario() {
        let cutoff = Some(DatePair::new(2024, 6));
        let included: Vec<_> = ["a/2024/05", "a/2024/06", "a/2024/07"]
            .iter()
            .map(|r| parse_archive_date(&reference(r)).unwrap())
            .filter(|d| satisfies_cutoff(*d, cutoff))
            .collect();
        assert_eq!(included, vec![DatePair::new(2024, 6), DatePair::new(2024, 7)]);
    }

    #[test]
    fn test_cutoff_has_no_upper_bound() {
        let cutoff = Some(DatePair::new(2020, 11));
        assert!(satisfies_cutoff(DatePair::new(2020, 11), cutoff));
        assert!(satisfies_cutoff(DatePair::new(2021, 1), cutoff));
        assert!(satisfies_cutoff(DatePair::new(2099, 1), cutoff));
        assert!(!satisfies_cutoff(DatePair::new(2020, 10), cutoff));
        assert!(!satisfies_cutoff(DatePair::new(2019, 12), cutoff));
    }

    #[test]
    fn test_inclusion_is_monotonic() {
        let cutoff = Some(DatePair::new(2022, 7));
        let mut dates = Vec::new();
        for year in 2020..=2024 {
            for month in 1..=12 {
                dates.push(DatePair::new(year, month));
            }
        }
        for a in &dates {
            for b in &dates {
                if satisfies_cutoff(*a, cutoff) && b >= a {
                    assert!(satisfies_cutoff(*b, cutoff), "{} included but {} not", a, b);
                }
            }
        }
    }

    #[test]
    fn test_missing_cutoff_includes_everything() {
        assert!(satisfies_cutoff(DatePair::new(2007, 1), None));
    }
}
