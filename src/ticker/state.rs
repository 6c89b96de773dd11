//! Per-strip mutable state.
//!
//! All mutation paths (poll, jitter, frame, status, controls) go through
//! here, and all of them are no-ops once the strip is unmounted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use super::jitter::{should_jitter, Jitter};
use super::scroll::{loop_width, ScrollState};
use crate::types::{MarketStatus, TickerItem};

/// What happened to a resolved fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Items replaced; carries the new count.
    Applied(usize),
    /// Endpoint returned nothing usable; current items kept.
    Empty,
    /// A newer fetch already resolved; response discarded.
    Stale,
    Unmounted,
}

/// Point-in-time copy of everything a renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSnapshot {
    pub items: Vec<TickerItem>,
    /// `items` twice, back-to-back.
    pub loop_items: Vec<TickerItem>,
    pub offset: f64,
    pub loop_width: f64,
    pub paused: bool,
    pub hovered: bool,
    pub manually_paused: bool,
    pub market_status: MarketStatus,
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// Bumped on every item mutation.
    pub revision: u64,
    pub mounted: bool,
}

#[derive(Debug)]
pub struct TickerState {
    items: Vec<TickerItem>,
    scroll: ScrollState,
    item_width_px: f64,
    market_status: MarketStatus,
    last_fetched: Option<Instant>,
    last_fetched_at: Option<DateTime<Utc>>,
    issued_seq: u64,
    applied_seq: u64,
    revision: u64,
    mounted: bool,
}

impl TickerState {
    pub fn new(
        items: Vec<TickerItem>,
        px_per_frame: f64,
        item_width_px: f64,
        market_status: MarketStatus,
    ) -> Self {
        Self {
            items,
            scroll: ScrollState::new(px_per_frame),
            item_width_px,
            market_status,
            last_fetched: None,
            last_fetched_at: None,
            issued_seq: 0,
            applied_seq: 0,
            revision: 0,
            mounted: true,
        }
    }

    pub fn items(&self) -> &[TickerItem] {
        &self.items
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn last_fetched(&self) -> Option<Instant> {
        self.last_fetched
    }

    pub fn loop_width(&self) -> f64 {
        loop_width(self.items.len(), self.item_width_px)
    }

    /// Tag for a fetch about to be issued.
    pub fn next_fetch_seq(&mut self) -> u64 {
        self.issued_seq += 1;
        self.issued_seq
    }

    /// Apply a resolved fetch tagged `seq`.
    ///
    /// Last-issued wins: a response older than one already applied is dropped.
    pub fn apply_fetch(
        &mut self,
        seq: u64,
        items: Option<Vec<TickerItem>>,
        now: Instant,
        wall: DateTime<Utc>,
    ) -> FetchOutcome {
        if !self.mounted {
            return FetchOutcome::Unmounted;
        }
        if seq <= self.applied_seq {
            return FetchOutcome::Stale;
        }
        self.applied_seq = seq;

        match items {
            Some(items) if !items.is_empty() => {
                let count = items.len();
                self.items = items;
                self.last_fetched = Some(now);
                self.last_fetched_at = Some(wall);
                self.revision += 1;
                FetchOutcome::Applied(count)
            }
            _ => FetchOutcome::Empty,
        }
    }

    /// Manual refresh pushes the jitter suppression window forward.
    pub fn mark_refreshed(&mut self, now: Instant) {
        if self.mounted {
            self.last_fetched = Some(now);
        }
    }

    /// Returns `true` if items were perturbed.
    pub fn jitter(&mut self, jitter: &mut Jitter, now: Instant, window: Duration) -> bool {
        if !self.mounted || !should_jitter(self.last_fetched, now, window) {
            return false;
        }
        jitter.apply(&mut self.items);
        self.revision += 1;
        true
    }

    pub fn advance_frame(&mut self) -> f64 {
        if !self.mounted {
            return self.scroll.offset();
        }
        let width = self.loop_width();
        self.scroll.advance(width)
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.mounted {
            self.scroll.toggle_pause();
        }
        self.scroll.manually_paused()
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        if self.mounted {
            self.scroll.set_hovered(hovered);
        }
    }

    pub fn set_market_status(&mut self, status: MarketStatus) {
        if self.mounted {
            self.market_status = status;
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn snapshot(&self) -> TickerSnapshot {
        let mut loop_items = Vec::with_capacity(self.items.len() * 2);
        loop_items.extend_from_slice(&self.items);
        loop_items.extend_from_slice(&self.items);

        TickerSnapshot {
            items: self.items.clone(),
            loop_items,
            offset: self.scroll.offset(),
            loop_width: self.loop_width(),
            paused: self.scroll.is_paused(),
            hovered: self.scroll.hovered(),
            manually_paused: self.scroll.manually_paused(),
            market_status: self.market_status,
            last_fetched_at: self.last_fetched_at,
            revision: self.revision,
            mounted: self.mounted,
        }
    }
}
