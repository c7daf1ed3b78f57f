//! Centralized configuration management for pgnsync

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

use crate::models::{DatePair, MonthlyBlobPolicy};
use crate::remote::chess_com::ChessComApi;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Account handle whose archives are mirrored
    pub account: Option<String>,
    /// Folder receiving game files and the `pgn/` subfolder
    pub output_dir: PathBuf,
    /// Only archives on or after this year/month are synced
    pub cutoff_year: Option<i32>,
    pub cutoff_month: Option<u32>,
    /// What to do with an already persisted monthly blob
    pub blob_policy: MonthlyBlobPolicy,
    /// Number of monthly archives fetched ahead of materialization
    pub fetch_concurrency: usize,
    /// Base URL of the published-data API
    pub api_base_url: String,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

/// Immutable settings for one sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub account: String,
    pub output_folder: String,
    pub cutoff: Option<DatePair>,
    pub blob_policy: MonthlyBlobPolicy,
    pub fetch_concurrency: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "pgnsync/0.1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: None,
            output_dir: "./chess".into(),
            cutoff_year: None,
            cutoff_month: None,
            blob_policy: MonthlyBlobPolicy::default(),
            fetch_concurrency: 1,
            api_base_url: ChessComApi::BASE_URL.to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let account = std::env::var("PGNSYNC_ACCOUNT").ok().filter(|a| !a.trim().is_empty());

        let output_dir = std::env::var("PGNSYNC_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let http = HttpConfig {
            timeout_seconds: parse_env_var("PGNSYNC_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.http.timeout_seconds),
            user_agent: std::env::var("PGNSYNC_USER_AGENT")
                .unwrap_or(defaults.http.user_agent),
        };

        Ok(Config {
            account,
            output_dir,
            cutoff_year: parse_env_var("PGNSYNC_CUTOFF_YEAR")?,
            cutoff_month: parse_env_var("PGNSYNC_CUTOFF_MONTH")?,
            blob_policy: parse_env_var("PGNSYNC_BLOB_POLICY")?.unwrap_or(defaults.blob_policy),
            fetch_concurrency: parse_env_var("PGNSYNC_FETCH_CONCURRENCY")?
                .unwrap_or(defaults.fetch_concurrency),
            api_base_url: std::env::var("PGNSYNC_API_BASE").unwrap_or(defaults.api_base_url),
            http,
        })
    }

    /// Get output directory as string
    pub fn output_dir_str(&self) -> &str {
        self.output_dir.to_str().unwrap_or("./chess")
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Cutoff month, if one is configured
    pub fn cutoff(&self) -> Result<Option<DatePair>> {
        match (self.cutoff_year, self.cutoff_month) {
            (None, None) => Ok(None),
            (Some(year), Some(month)) if (1..=12).contains(&month) => Ok(Some(DatePair::new(year, month))),
            (Some(_), Some(month)) => Err(anyhow::anyhow!("Cutoff month must be 1-12, got {}", month)),
            _ => Err(anyhow::anyhow!("Cutoff year and cutoff month must be set together")),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.cutoff()?;

        if self.fetch_concurrency == 0 {
            return Err(anyhow::anyhow!("Fetch concurrency must be at least 1"));
        }

        if self.http.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be at least one second"));
        }

        Ok(())
    }

    /// Freeze the settings needed by a sync run
    pub fn sync_config(&self) -> Result<SyncConfig> {
        self.validate()?;

        let account = self
            .account
            .clone()
            .context("No account configured. Pass --account or set PGNSYNC_ACCOUNT")?;

        Ok(SyncConfig {
            account,
            output_folder: self.output_dir_str().to_string(),
            cutoff: self.cutoff()?,
            blob_policy: self.blob_policy,
            fetch_concurrency: self.fetch_concurrency,
        })
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var_name) {
        Ok(val) => val
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to parse environment variable {} = '{}'", var_name, val)),
        Err(_) => Ok(None),
    }
}
