//! REST market-data feed.
//!
//! Single `GET {base_url}{path}` returning `{ "indices": [...], "ticker_tape": [...] }`.
//! Auth: optional, `Authorization: Api-Key {key}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

use super::{MarketDataSource, MarketSnapshot};
use crate::config::FeedConfig;
use crate::types::TickerError;

const SOURCE_NAME: &str = "http";

/// Market-data endpoint client.
pub struct HttpMarketFeed {
    http: Client,
    url: String,
    api_key: Option<SecretString>,
}

impl HttpMarketFeed {
    pub fn new(
        base_url: &str,
        path: &str,
        timeout: Duration,
        api_key: Option<SecretString>,
    ) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(TickerError::Config("feed base_url is empty".into()).into());
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tickerstrip/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for market feed")?;

        Ok(Self {
            http,
            url: join_url(base_url, path),
            api_key,
        })
    }

    pub fn from_config(cfg: &FeedConfig, api_key: Option<SecretString>) -> Result<Self> {
        Self::new(&cfg.base_url, &cfg.path, Duration::from_secs(cfg.timeout_secs), api_key)
    }

    /// Fully-qualified endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();
    if path.is_empty() {
        base.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[async_trait]
impl MarketDataSource for HttpMarketFeed {
    async fn fetch_snapshot(&self) -> Result<MarketSnapshot> {
        debug!(url = %self.url, "Fetching market snapshot");

        let mut req = self.http.get(&self.url);
        if let Some(key) = &self.api_key {
            req = req.header(
                reqwest::header::AUTHORIZATION,
                format!("Api-Key {}", key.expose_secret()),
            );
        }

        let resp = req.send().await.context("Market endpoint request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TickerError::Endpoint { status: status.as_u16() }.into());
        }

        let body = resp
            .text()
            .await
            .context("Failed to read market endpoint response")?;

        let snapshot: MarketSnapshot =
            serde_json::from_str(&body).map_err(|e| TickerError::Decode(e.to_string()))?;

        debug!(
            indices = snapshot.indices.len(),
            tape = snapshot.ticker_tape.len(),
            "Market snapshot received"
        );
        Ok(snapshot)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
