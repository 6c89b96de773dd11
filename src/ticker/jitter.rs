//! Cosmetic price jitter between polls.
//!
//! Non-authoritative: makes the strip look alive while the next poll is
//! pending. Never runs close to a fresh poll so it cannot visibly fight
//! real data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::Instant;

use crate::types::{InstrumentType, TickerItem};

/// Max relative step per tick for each instrument type.
pub fn volatility(kind: InstrumentType) -> f64 {
    match kind {
        InstrumentType::Currency => 0.0005,
        InstrumentType::Index | InstrumentType::Commodity => 0.001,
        InstrumentType::Stock => 0.002,
    }
}

/// Jitter runs only once the last successful poll is older than `window`.
/// A strip that never fetched successfully always jitters.
pub fn should_jitter(last_fetched: Option<Instant>, now: Instant, window: Duration) -> bool {
    match last_fetched {
        Some(at) => now.saturating_duration_since(at) > window,
        None => true,
    }
}

#[derive(Debug)]
pub struct Jitter {
    rng: StdRng,
}

impl Jitter {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Multiply the price by `1 + u * volatility` with `u` in `[-1, 1]`.
    pub fn perturb(&mut self, item: &mut TickerItem) {
        let u: f64 = self.rng.gen_range(-1.0..=1.0);
        let new_price = item.price() * (1.0 + u * volatility(item.kind()));
        item.reprice(new_price);
    }

    pub fn apply(&mut self, items: &mut [TickerItem]) {
        for item in items.iter_mut() {
            self.perturb(item);
        }
    }
}
