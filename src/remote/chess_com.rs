//! chess.com published-data API client

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::errors::SyncError;
use crate::models::{ArchiveReference, DatePair, MonthlyBlob};
use crate::remote::ArchiveSource;

/// chess.com API endpoints and constants
pub struct ChessComApi;

impl ChessComApi {
    /// Base URL of the published-data API
    pub const BASE_URL: &'static str = "https://api.chess.com";
    /// Player endpoint prefix
    pub const PLAYER_ENDPOINT: &'static str = "/pub/player";
}

/// Body of the archive index endpoint
#[derive(Debug, Deserialize)]
pub struct ArchiveIndexResponse {
    pub archives: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChessComClient {
    client: Client,
    base_url: String,
}

impl ChessComClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        ChessComClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn archive_index_url(&self, account: &str) -> String {
        format!(
            "{}{}/{}/games/archives",
            self.base_url,
            ChessComApi::PLAYER_ENDPOINT,
            account.to_lowercase()
        )
    }

    pub fn monthly_pgn_url(&self, account: &str, period: DatePair) -> String {
        format!(
            "{}{}/{}/games/{}/pgn",
            self.base_url,
            ChessComApi::PLAYER_ENDPOINT,
            account.to_lowercase(),
            period.url_segment()
        )
    }

    async fn get(&self, url: &str) -> Result<Response, SyncError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::remote(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::remote(url, format!("HTTP {}", status)));
        }

        Ok(response)
    }
}

#[async_trait]
impl ArchiveSource for ChessComClient {
    async fn archive_index(&self, account: &str) -> Result<Vec<ArchiveReference>, SyncError> {
        let url = self.archive_index_url(account);
        let body: ArchiveIndexResponse = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::remote(&url, format!("undecodable archive index: {}", e)))?;

        Ok(body.archives.into_iter().map(ArchiveReference::new).collect())
    }

    async fn monthly_blob(&self, account: &str, period: DatePair) -> Result<MonthlyBlob, SyncError> {
        let url = self.monthly_pgn_url(account, period);
        let text = self
            .get(&url)
            .await?
            .text()
            .await
            .map_err(|e| SyncError::remote(&url, e))?;

        debug!("Fetched {} bytes for {}", text.len(), period);
        Ok(MonthlyBlob { period, text })
    }
}
