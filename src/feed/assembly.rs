//! Snapshot → strip items.
//!
//! The strip always shows indices first, then the ticker tape, then a fixed
//! block of currency and commodity quotes the endpoint does not carry.

use super::MarketSnapshot;
use crate::types::{InstrumentType, TickerItem};

/// Caps applied when turning a snapshot into items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLimits {
    pub max_indices: usize,
    pub max_tape: usize,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self { max_indices: 5, max_tape: 15 }
    }
}

/// Build the full item list from a snapshot.
///
/// Returns `None` when the snapshot carries no indices and no tape quotes;
/// the caller keeps whatever it is currently showing.
pub fn build_items(snapshot: &MarketSnapshot, limits: FeedLimits) -> Option<Vec<TickerItem>> {
    if snapshot.is_empty() {
        return None;
    }

    let indices = snapshot.indices.iter().take(limits.max_indices).map(|idx| {
        let name = if idx.name.is_empty() { idx.code.clone() } else { idx.name.clone() };
        TickerItem::new(
            idx.code.clone(),
            name,
            idx.current_value,
            idx.change,
            idx.change_percent,
            InstrumentType::Index,
        )
    });

    let tape = snapshot.ticker_tape.iter().take(limits.max_tape).map(|q| {
        let name = if q.name.is_empty() { q.symbol.clone() } else { q.name.clone() };
        TickerItem::new(
            q.symbol.clone(),
            name,
            q.current_price,
            q.price_change,
            q.price_change_percent,
            InstrumentType::Stock,
        )
        .with_exchange(q.exchange.clone())
    });

    Some(indices.chain(tape).chain(fixed_items()).collect())
}

/// Currency and commodity quotes appended to every list.
pub fn fixed_items() -> Vec<TickerItem> {
    vec![
        TickerItem::new("USD/ZAR", "US Dollar / Rand", 18.2450, -0.0820, -0.45, InstrumentType::Currency),
        TickerItem::new("EUR/ZAR", "Euro / Rand", 19.7310, -0.0410, -0.21, InstrumentType::Currency),
        TickerItem::new("GBP/ZAR", "Pound / Rand", 23.0125, 0.0370, 0.16, InstrumentType::Currency),
        TickerItem::new("GOLD", "Gold (USD/oz)", 2341.60, 12.40, 0.53, InstrumentType::Commodity),
    ]
}

/// Plausible list shown on first paint, before any fetch resolves.
pub fn fallback_items() -> Vec<TickerItem> {
    let jse = || Some("JSE".to_string());
    let mut items = vec![
        TickerItem::new("J203", "FTSE/JSE All Share", 80_412.33, 356.21, 0.44, InstrumentType::Index),
        TickerItem::new("J200", "FTSE/JSE Top 40", 73_905.18, 341.02, 0.46, InstrumentType::Index),
        TickerItem::new("J210", "FTSE/JSE Resource 10", 61_250.74, -212.56, -0.35, InstrumentType::Index),
        TickerItem::new("NPN", "Naspers", 3_250.00, 12.50, 0.39, InstrumentType::Stock)
            .with_exchange(jse()),
        TickerItem::new("PRX", "Prosus", 652.40, -4.10, -0.62, InstrumentType::Stock)
            .with_exchange(jse()),
        TickerItem::new("SBK", "Standard Bank", 210.35, 1.85, 0.89, InstrumentType::Stock)
            .with_exchange(jse()),
        TickerItem::new("FSR", "FirstRand", 74.12, -0.38, -0.51, InstrumentType::Stock)
            .with_exchange(jse()),
        TickerItem::new("MTN", "MTN Group", 92.80, 0.00, 0.00, InstrumentType::Stock)
            .with_exchange(jse()),
    ];
    items.extend(fixed_items());
    items
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
