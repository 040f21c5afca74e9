use std::future::Future;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;
use crate::types::{ChallengeCatalogSnapshot, ScoreboardSnapshot};

/// Anything that can produce scoreboard and challenge snapshots.
pub trait SnapshotSource {
    fn fetch_scoreboard(
        &self,
    ) -> impl Future<Output = Result<ScoreboardSnapshot, FetchError>> + Send;

    fn fetch_challenges(
        &self,
    ) -> impl Future<Output = Result<ChallengeCatalogSnapshot, FetchError>> + Send;
}

/// CTFd REST API client authenticated with an access token.
#[derive(Debug, Clone)]
pub struct CtfdClient {
    base_url: String,
    api_token: String,
    http: reqwest::Client,
}

impl CtfdClient {
    /// `base_url` should include the API prefix, e.g. `https://ctf.example.com/api/v1`.
    pub fn new(
        base_url: &str,
        api_token: &str,
        insecure_skip_verify: bool,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            http: crate::http_client(insecure_skip_verify)?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let resp = self
            .http
            .get(format!("{}{endpoint}", self.base_url))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Token {}", self.api_token))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl SnapshotSource for CtfdClient {
    async fn fetch_scoreboard(&self) -> Result<ScoreboardSnapshot, FetchError> {
        let scoreboard: ScoreboardSnapshot = self.get_json("/scoreboard").await?;
        if !scoreboard.success {
            return Err(FetchError::Unsuccessful);
        }
        debug!("Fetched scoreboard with {} entries", scoreboard.data.len());
        Ok(scoreboard)
    }

    async fn fetch_challenges(&self) -> Result<ChallengeCatalogSnapshot, FetchError> {
        let mut challenges: ChallengeCatalogSnapshot = self.get_json("/challenges").await?;
        if !challenges.success {
            return Err(FetchError::Unsuccessful);
        }
        challenges.sort_by_id();
        debug!("Fetched {} challenges", challenges.data.len());
        Ok(challenges)
    }
}
