use crate::error::GameStateError;
use crate::scrapers::json_page::parse_json_body;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Anything that can turn a URL into a JSON document.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, GameStateError>;
}

/// Fetches JSON over HTTP. No retries are attempted.
pub struct HttpJsonFetcher {
    client: reqwest::Client,
}

impl HttpJsonFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, GameStateError> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GameStateError::unavailable(url, e))?;

        if !response.status().is_success() {
            return Err(GameStateError::unavailable(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GameStateError::unavailable(url, e))?;

        parse_json_body(&body).map_err(|e| GameStateError::unavailable(url, format!("{:#}", e)))
    }
}
