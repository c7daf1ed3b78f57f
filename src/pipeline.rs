//! The sync run: index -> filter -> fetch -> split -> materialize

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::filter::{parse_archive_date, satisfies_cutoff};
use crate::materializer::{BlobOutcome, GameOutcome, Materializer};
use crate::models::{ArchiveReference, DatePair, MonthlyBlob, SyncSummary};
use crate::pgn::split_records;
use crate::remote::ArchiveSource;
use crate::storage::Vault;

/// Cooperative cancellation, checked between archives
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum ArchiveDecision {
    Included(DatePair),
    Excluded(DatePair),
    Malformed(SyncError),
}

#[derive(Debug)]
pub struct PlannedArchive {
    pub reference: ArchiveReference,
    pub decision: ArchiveDecision,
}

/// Classify each reference against the cutoff, keeping index order.
pub fn plan_archives(references: Vec<ArchiveReference>, cutoff: Option<DatePair>) -> Vec<PlannedArchive> {
    references
        .into_iter()
        .map(|reference| {
            let decision = match parse_archive_date(&reference) {
                Ok(date) if satisfies_cutoff(date, cutoff) => ArchiveDecision::Included(date),
                Ok(date) => ArchiveDecision::Excluded(date),
                Err(e) => ArchiveDecision::Malformed(e),
            };
            PlannedArchive { reference, decision }
        })
        .collect()
}

/// Fetch the archive index and classify it without downloading anything.
pub async fn list_archives(
    source: &dyn ArchiveSource,
    account: &str,
    cutoff: Option<DatePair>,
) -> Result<Vec<PlannedArchive>, SyncError> {
    let references = source.archive_index(account).await?;
    Ok(plan_archives(references, cutoff))
}

/// Run one sync.
///
/// Only an unreachable archive index fails the run. Every other failure is
/// recorded in the summary and scoped to its archive, record or file.
pub async fn run_sync(
    source: &dyn ArchiveSource,
    vault: &dyn Vault,
    config: &SyncConfig,
    cancel: &CancelFlag,
) -> Result<SyncSummary, SyncError> {
    let mut summary = SyncSummary::new();
    info!(
        "Starting sync for account: {} (monthly blobs: {})",
        config.account,
        config.blob_policy.as_str()
    );

    let references = source.archive_index(&config.account).await?;
    summary.archives_listed = references.len();
    info!("Found {} monthly archives", references.len());

    let mut included = Vec::new();
    for planned in plan_archives(references, config.cutoff) {
        match planned.decision {
            ArchiveDecision::Included(date) => included.push(date),
            ArchiveDecision::Excluded(date) => {
                debug!("Skipping {} (before cutoff)", date);
                summary.archives_excluded += 1;
            }
            ArchiveDecision::Malformed(e) => {
                warn!("✗ {}", e);
                summary.record_error(planned.reference.as_str(), &e);
            }
        }
    }
    summary.archives_included = included.len();

    let materializer = Materializer::new(vault, &config.output_folder, config.blob_policy);
    let account = config.account.as_str();

    // Fetches may run ahead; results still arrive in index order.
    let fetches = stream::iter(included)
        .map(|period| async move {
            if cancel.is_cancelled() {
                return (period, None);
            }
            (period, Some(source.monthly_blob(account, period).await))
        })
        .buffered(config.fetch_concurrency.max(1));
    futures::pin_mut!(fetches);

    loop {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        let Some((period, fetched)) = fetches.next().await else {
            break;
        };

        match fetched {
            None => {
                summary.cancelled = true;
                break;
            }
            Some(Ok(blob)) => {
                process_month(&materializer, &blob, &mut summary).await;
                summary.archives_processed += 1;
            }
            Some(Err(e)) => {
                warn!("✗ Failed to fetch games for {}: {}", period, e);
                summary.record_error(&period.to_string(), &e);
            }
        }
    }

    if summary.cancelled {
        warn!("Sync cancelled after {} archives", summary.archives_processed);
    }

    summary.finish();
    info!(
        "Sync finished: {} archives processed, {} games written, {} already present, {} errors",
        summary.archives_processed,
        summary.games_materialized,
        summary.games_skipped,
        summary.errors.total()
    );
    Ok(summary)
}

/// Persist one month's blob and materialize each of its games.
pub async fn process_month(materializer: &Materializer<'_>, blob: &MonthlyBlob, summary: &mut SyncSummary) {
    let period = blob.period.to_string();

    match materializer.persist_monthly_blob(blob).await {
        Ok(BlobOutcome::Written(_)) => summary.blobs_written += 1,
        Ok(BlobOutcome::Kept(_)) => summary.blobs_kept += 1,
        Err(e) => {
            warn!("✗ Could not save monthly archive {}: {}", period, e);
            summary.record_error(&period, &e);
        }
    }

    let records = split_records(&blob.text);
    info!("Found {} games in {}", records.len(), period);
    summary.games_found += records.len();

    for (index, record) in records.iter().enumerate() {
        match materializer.materialize_record(record).await {
            Ok(GameOutcome::Written(_)) => summary.games_materialized += 1,
            Ok(GameOutcome::AlreadyPresent(_)) => summary.games_skipped += 1,
            Err(e) => {
                warn!("✗ Game {}/{} of {}: {}", index + 1, records.len(), period, e);
                summary.record_error(&format!("{} game {}", period, index + 1), &e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(list: &[&str]) -> Vec<ArchiveReference> {
        list.iter().map(|r| ArchiveReference::new(*r)).collect()
    }

    #[test]
    fn test_plan_keeps_index_order() {
        let planned = plan_archives(
            refs(&["u/2024/07", "u/2024/05", "garbage", "u/2024/06"]),
            Some(DatePair::new(2024, 6)),
        );

        assert_eq!(planned.len(), 4);
        assert!(matches!(planned[0].decision, ArchiveDecision::Included(d) if d == DatePair::new(2024, 7)));
        assert!(matches!(planned[1].decision, ArchiveDecision::Excluded(_)));
        assert!(matches!(planned[2].decision, ArchiveDecision::Malformed(_)));
        assert!(matches!(planned[3].decision, ArchiveDecision::Included(d) if d == DatePair::new(2024, 6)));
        assert_eq!(planned[2].reference.as_str(), "garbage");
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
