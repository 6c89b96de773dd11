//! Market data feed.
//!
//! Defines the `MarketDataSource` trait, the wire shapes returned by the
//! market-data endpoint, and provides:
//! - `HttpMarketFeed`: polls the REST endpoint over `reqwest`
//! - `assembly`: turns a snapshot into strip items (plus the fallback list)

pub mod assembly;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

/// Abstraction over wherever index values and the ticker tape come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the current indices and ticker tape.
    async fn fetch_snapshot(&self) -> Result<MarketSnapshot>;

    /// Source name for logging.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One poll's worth of market data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub indices: Vec<IndexSnapshot>,
    #[serde(default, alias = "tickerTape")]
    pub ticker_tape: Vec<TapeQuote>,
}

impl MarketSnapshot {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.ticker_tape.is_empty()
    }
}

/// A market benchmark, e.g. the all-share index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexSnapshot {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_value: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub change: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub change_percent: f64,
}

/// One instrument quote from the ticker tape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TapeQuote {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change_percent: f64,
    #[serde(default)]
    pub exchange: Option<String>,
}

/// Accept `12.5`, `"12.5"`, `"1,234.50"`, `""` or `null`.
///
/// Decimal columns usually come over the wire as strings.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::Text(s)) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return Ok(0.0);
            }
            cleaned
                .parse::<f64>()
                .map_err(|e| serde::de::Error::custom(format!("invalid number {s:?}: {e}")))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
