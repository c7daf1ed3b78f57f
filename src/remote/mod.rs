//! Remote archive sources
//!
//! The pipeline talks to the remote service through [`ArchiveSource`], so a
//! run can be driven by the chess.com HTTP client or by an in-process fake.

use async_trait::async_trait;

use crate::errors::SyncError;
use crate::models::{ArchiveReference, DatePair, MonthlyBlob};

pub mod chess_com;

pub use chess_com::ChessComClient;

#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Monthly archive identifiers for an account, in the order the remote lists them
    async fn archive_index(&self, account: &str) -> Result<Vec<ArchiveReference>, SyncError>;

    /// Raw PGN text of every game the account played in one month
    async fn monthly_blob(&self, account: &str, period: DatePair) -> Result<MonthlyBlob, SyncError>;
}
