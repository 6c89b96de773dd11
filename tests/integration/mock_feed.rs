//! Mock market feed for integration testing.
//!
//! Provides a deterministic `MarketDataSource` that replays a script of
//! responses (each with an optional delay), then falls back to a default
//! snapshot. All in-memory, no network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tickerstrip::feed::{IndexSnapshot, MarketDataSource, MarketSnapshot, TapeQuote};

enum Scripted {
    Respond(Duration, MarketSnapshot),
    Fail(Duration, String),
}

pub struct MockFeed {
    script: Mutex<VecDeque<Scripted>>,
    default: Mutex<MarketSnapshot>,
    calls: AtomicUsize,
}

impl MockFeed {
    /// Every call answers `default` immediately unless scripted otherwise.
    pub fn new(default: MarketSnapshot) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: Mutex::new(default),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a response for the next unscripted call.
    pub fn then_respond(self, delay: Duration, snapshot: MarketSnapshot) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Respond(delay, snapshot));
        self
    }

    /// Queue a failure for the next unscripted call.
    pub fn then_fail(self, delay: Duration, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(delay, message.to_string()));
        self
    }

    pub fn set_default(&self, snapshot: MarketSnapshot) {
        *self.default.lock().unwrap() = snapshot;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockFeed {
    async fn fetch_snapshot(&self) -> Result<MarketSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Respond(delay, snapshot)) => {
                tokio::time::sleep(delay).await;
                Ok(snapshot)
            }
            Some(Scripted::Fail(delay, message)) => {
                tokio::time::sleep(delay).await;
                Err(anyhow!(message))
            }
            None => Ok(self.default.lock().unwrap().clone()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// A snapshot with `n_indices` indices and `n_tape` tape quotes.
///
/// Index `i` moves by `i - 1` points so the list mixes up and down moves.
pub fn snapshot(n_indices: usize, n_tape: usize) -> MarketSnapshot {
    MarketSnapshot {
        indices: (0..n_indices)
            .map(|i| {
                let change = i as f64 - 1.0;
                IndexSnapshot {
                    code: format!("IDX{i}"),
                    name: format!("Index {i}"),
                    current_value: 10_000.0 + change,
                    change,
                    change_percent: change / 100.0,
                }
            })
            .collect(),
        ticker_tape: (0..n_tape)
            .map(|i| {
                let change = 0.5 - i as f64 * 0.25;
                TapeQuote {
                    symbol: format!("STK{i}"),
                    name: format!("Stock {i}"),
                    current_price: 100.0 + change,
                    price_change: change,
                    price_change_percent: change,
                    exchange: Some("JSE".to_string()),
                }
            })
            .collect(),
    }
}
