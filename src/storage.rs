//! Filesystem capability used by the materializer

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// The four filesystem operations the sync pipeline needs.
/// Paths are vault paths, already passed through [`normalize_path`].
#[async_trait]
pub trait Vault: Send + Sync {
    async fn exists(&self, path: &str) -> std::io::Result<bool>;

    /// Create a directory and its parents; succeeds if it already exists
    async fn mkdir(&self, path: &str) -> std::io::Result<()>;

    /// Create or truncate
    async fn write(&self, path: &str, content: &str) -> std::io::Result<()>;

    async fn append(&self, path: &str, content: &str) -> std::io::Result<()>;
}

/// Vault backed by the local filesystem, rooted at a base directory.
/// Absolute vault paths bypass the base.
#[derive(Debug, Clone)]
pub struct LocalVault {
    base: PathBuf,
}

impl LocalVault {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        LocalVault { base: base.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base.join(path)
    }
}

#[async_trait]
impl Vault for LocalVault {
    async fn exists(&self, path: &str) -> std::io::Result<bool> {
        fs::try_exists(self.resolve(path)).await
    }

    async fn mkdir(&self, path: &str) -> std::io::Result<()> {
        fs::create_dir_all(self.resolve(path)).await
    }

    async fn write(&self, path: &str, content: &str) -> std::io::Result<()> {
        fs::write(self.resolve(path), content).await
    }

    async fn append(&self, path: &str, content: &str) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(self.resolve(path))
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await
    }
}

/// Normalize a vault path: `/` separators only, no empty or `.` segments,
/// no trailing separator. A leading `/` is kept.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let joined = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join vault path segments and normalize the result
pub fn join_path(parent: &str, child: &str) -> String {
    normalize_path(&format!("{}/{}", parent, child))
}
