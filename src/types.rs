//! Shared types for the ticker strip.
//!
//! `TickerItem` is the unit everything else moves around: the feed builds
//! them, the strip mutates them, the entry renderer formats them.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Instrument type
// ---------------------------------------------------------------------------

/// What kind of instrument a ticker item quotes.
///
/// Drives two things only: the detail-page route and the jitter magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    Index,
    Stock,
    Currency,
    Commodity,
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentType::Index => write!(f, "index"),
            InstrumentType::Stock => write!(f, "stock"),
            InstrumentType::Currency => write!(f, "currency"),
            InstrumentType::Commodity => write!(f, "commodity"),
        }
    }
}

impl std::str::FromStr for InstrumentType {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "index" | "indices" => Ok(InstrumentType::Index),
            "stock" | "equity" | "share" => Ok(InstrumentType::Stock),
            "currency" | "fx" | "forex" => Ok(InstrumentType::Currency),
            "commodity" => Ok(InstrumentType::Commodity),
            other => Err(TickerError::Decode(format!("unknown instrument type: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Ticker item
// ---------------------------------------------------------------------------

/// One instrument quote as shown in the strip.
///
/// Fields are private to the crate so that `is_up` can only ever be derived
/// from `change`; every mutation goes through [`TickerItem::new`] or
/// [`TickerItem::reprice`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerItem {
    pub(crate) symbol: String,
    pub(crate) name: String,
    pub(crate) price: f64,
    pub(crate) change: f64,
    pub(crate) change_percent: f64,
    pub(crate) is_up: bool,
    pub(crate) exchange: Option<String>,
    #[serde(rename = "type")]
    pub(crate) kind: InstrumentType,
}

impl TickerItem {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        change: f64,
        change_percent: f64,
        kind: InstrumentType,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            change,
            change_percent,
            is_up: change >= 0.0,
            exchange: None,
            kind,
        }
    }

    pub fn with_exchange(mut self, exchange: Option<String>) -> Self {
        self.exchange = exchange.filter(|e| !e.trim().is_empty());
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn change(&self) -> f64 {
        self.change
    }

    pub fn change_percent(&self) -> f64 {
        self.change_percent
    }

    pub fn is_up(&self) -> bool {
        self.is_up
    }

    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }

    pub fn kind(&self) -> InstrumentType {
        self.kind
    }

    /// The price the deltas are measured against (previous close or
    /// session open, depending on the source).
    pub fn reference_price(&self) -> f64 {
        self.price - self.change
    }

    /// Move the quote to `new_price`, keeping the reference price fixed.
    pub fn reprice(&mut self, new_price: f64) {
        let reference = self.reference_price();
        self.price = new_price;
        self.change = new_price - reference;
        self.change_percent = if reference.abs() > f64::EPSILON {
            self.change / reference * 100.0
        } else {
            0.0
        };
        self.is_up = self.change >= 0.0;
    }

    /// Detail-page route for this instrument.
    pub fn href(&self) -> String {
        match self.kind {
            InstrumentType::Index => {
                format!("/markets/indices/{}", urlencoding::encode(&self.symbol))
            }
            InstrumentType::Stock => format!("/companies/{}", urlencoding::encode(&self.symbol)),
            InstrumentType::Currency | InstrumentType::Commodity => "/markets".to_string(),
        }
    }
}

impl fmt::Display for TickerItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2} {:+.2} ({:+.2}%)",
            self.symbol, self.price, self.change, self.change_percent
        )
    }
}

// ---------------------------------------------------------------------------
// Market status
// ---------------------------------------------------------------------------

/// Decorative trading-session status shown next to the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    PreOpen,
    Open,
    ClosingAuction,
    Closed,
    Weekend,
}

impl MarketStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MarketStatus::PreOpen => "Pre-open",
            MarketStatus::Open => "Market open",
            MarketStatus::ClosingAuction => "Closing auction",
            MarketStatus::Closed => "Market closed",
            MarketStatus::Weekend => "Closed for the weekend",
        }
    }

    /// Whether orders would be matching in this session.
    pub fn is_trading(&self) -> bool {
        matches!(self, MarketStatus::Open | MarketStatus::ClosingAuction)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the ticker.
#[derive(Debug, thiserror::Error)]
pub enum TickerError {
    #[error("Market endpoint returned {status}")]
    Endpoint { status: u16 },

    #[error("Could not decode market payload: {0}")]
    Decode(String),

    #[error("Market endpoint returned no instruments")]
    EmptyFeed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ticker strip is no longer mounted")]
    Unmounted,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
