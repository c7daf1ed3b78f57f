//! Writing game records and monthly blobs into the vault

use tracing::{debug, info};

use crate::errors::SyncError;
use crate::models::{GameFileKey, GameRecord, MonthlyBlob, MonthlyBlobPolicy};
use crate::storage::{join_path, normalize_path, Vault};

/// Subfolder of the output root holding raw monthly blobs
pub const PGN_FOLDER: &str = "pgn";

const FENCE_OPEN: &str = "```\n";
const FENCE_CLOSE: &str = "\n```\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    Written(String),
    AlreadyPresent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobOutcome {
    Written(String),
    Kept(String),
}

pub struct Materializer<'a> {
    vault: &'a dyn Vault,
    root: String,
    blob_policy: MonthlyBlobPolicy,
}

impl<'a> Materializer<'a> {
    pub fn new(vault: &'a dyn Vault, root: &str, blob_policy: MonthlyBlobPolicy) -> Self {
        Materializer {
            vault,
            root: normalize_path(root),
            blob_policy,
        }
    }

    pub fn game_path(&self, key: &GameFileKey) -> String {
        join_path(&self.root, &key.file_name())
    }

    pub fn blob_path(&self, blob: &MonthlyBlob) -> String {
        join_path(&self.root, &format!("{}/{}.pgn", PGN_FOLDER, blob.period))
    }

    /// Write one game unless a file already exists at its path.
    pub async fn materialize_record(&self, record: &GameRecord) -> Result<GameOutcome, SyncError> {
        let key = GameFileKey::from_record(record)?;
        let path = self.game_path(&key);

        if self.exists(&path).await? {
            debug!("{} exists, skipping", path);
            return Ok(GameOutcome::AlreadyPresent(path));
        }

        self.mkdir(&self.root).await?;

        // A crash between steps leaves a file without the closing fence.
        self.vault
            .write(&path, FENCE_OPEN)
            .await
            .map_err(|e| SyncError::filesystem(&path, e))?;
        self.vault
            .append(&path, record.text())
            .await
            .map_err(|e| SyncError::filesystem(&path, e))?;
        self.vault
            .append(&path, FENCE_CLOSE)
            .await
            .map_err(|e| SyncError::filesystem(&path, e))?;

        info!("Wrote {}", path);
        Ok(GameOutcome::Written(path))
    }

    /// Persist the raw monthly blob under `<root>/pgn/`.
    pub async fn persist_monthly_blob(&self, blob: &MonthlyBlob) -> Result<BlobOutcome, SyncError> {
        let path = self.blob_path(blob);

        if self.blob_policy == MonthlyBlobPolicy::KeepExisting && self.exists(&path).await? {
            debug!("{} exists, keeping it", path);
            return Ok(BlobOutcome::Kept(path));
        }

        self.mkdir(&join_path(&self.root, PGN_FOLDER)).await?;
        self.vault
            .write(&path, &blob.text)
            .await
            .map_err(|e| SyncError::filesystem(&path, e))?;

        info!("Saved monthly archive {}", path);
        Ok(BlobOutcome::Written(path))
    }

    async fn exists(&self, path: &str) -> Result<bool, SyncError> {
        self.vault
            .exists(path)
            .await
            .map_err(|e| SyncError::filesystem(path, e))
    }

    async fn mkdir(&self, path: &str) -> Result<(), SyncError> {
        if self.exists(path).await? {
            return Ok(());
        }
        self.vault
            .mkdir(path)
            .await
            .map_err(|e| SyncError::filesystem(path, e))
    }
}
