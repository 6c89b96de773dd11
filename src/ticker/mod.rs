//! The ticker strip.
//!
//! A mounted strip owns four cooperative loops, all driven by tokio timers:
//!
//! - poll: fetch the market endpoint every `poll_interval` (and on manual refresh)
//! - jitter: perturb prices every `jitter_interval` unless a poll just landed
//! - frame: advance the scroll offset every `frame_interval`
//! - status: recompute the decorative market status every `status_interval`
//!
//! Each loop listens on a shared shutdown channel. `unmount` flips the state's
//! mounted flag, signals shutdown, aborts in-flight fetches and joins every
//! loop; after it returns nothing touches the state again.

pub mod entry;
pub mod jitter;
pub mod scroll;
pub mod state;

use chrono::Utc;
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::calendar::MarketCalendar;
use crate::config::StripSettings;
use crate::feed::assembly::{build_items, fallback_items, FeedLimits};
use crate::feed::MarketDataSource;
use crate::types::{MarketStatus, TickerError};

use self::jitter::Jitter;
use self::state::{FetchOutcome, TickerSnapshot, TickerState};

pub type SharedState = Arc<RwLock<TickerState>>;

/// Handle to a mounted ticker strip.
pub struct TickerStrip {
    id: Uuid,
    state: SharedState,
    refresh_tx: mpsc::UnboundedSender<()>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TickerStrip {
    /// Mount a strip: fallback items are visible immediately, then the loops
    /// start and the first poll is issued straight away.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(
        settings: StripSettings,
        source: Arc<dyn MarketDataSource>,
        calendar: Arc<dyn MarketCalendar>,
    ) -> Self {
        let id = Uuid::new_v4();
        let state: SharedState = Arc::new(RwLock::new(TickerState::new(
            fallback_items(),
            settings.scroll_px_per_frame,
            settings.item_width_px,
            calendar.status_now(),
        )));

        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tasks = vec![
            tokio::spawn(poll_loop(
                id,
                state.clone(),
                source,
                settings.clone(),
                refresh_rx,
                shutdown_rx.clone(),
            )),
            tokio::spawn(jitter_loop(id, state.clone(), settings.clone(), shutdown_rx.clone())),
            tokio::spawn(frame_loop(state.clone(), settings.clone(), shutdown_rx.clone())),
            tokio::spawn(status_loop(id, state.clone(), calendar, settings.clone(), shutdown_rx)),
        ];

        info!(
            strip = %id,
            poll_secs = settings.poll_interval.as_secs(),
            jitter_secs = settings.jitter_interval.as_secs(),
            frame_ms = settings.frame_interval.as_millis() as u64,
            "Ticker strip mounted"
        );

        Self {
            id,
            state,
            refresh_tx,
            shutdown_tx,
            tasks: Mutex::new(tasks),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn snapshot(&self) -> TickerSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn is_mounted(&self) -> bool {
        self.state.read().await.is_mounted()
    }

    /// Flip the manual pause. Returns the new manual-pause state.
    pub async fn toggle_pause(&self) -> Result<bool, TickerError> {
        let mut st = self.state.write().await;
        if !st.is_mounted() {
            return Err(TickerError::Unmounted);
        }
        let paused = st.toggle_pause();
        debug!(strip = %self.id, paused, "Manual pause toggled");
        Ok(paused)
    }

    /// Pointer entered (`true`) or left (`false`) the strip.
    pub async fn set_hovered(&self, hovered: bool) -> Result<(), TickerError> {
        let mut st = self.state.write().await;
        if !st.is_mounted() {
            return Err(TickerError::Unmounted);
        }
        st.set_hovered(hovered);
        Ok(())
    }

    /// Re-trigger the fetch path and reset the jitter suppression window.
    pub async fn refresh(&self) -> Result<(), TickerError> {
        {
            let mut st = self.state.write().await;
            if !st.is_mounted() {
                return Err(TickerError::Unmounted);
            }
            st.mark_refreshed(Instant::now());
        }
        self.refresh_tx.send(()).map_err(|_| TickerError::Unmounted)?;
        debug!(strip = %self.id, "Manual refresh requested");
        Ok(())
    }

    /// Stop every loop and wait for them to finish. Idempotent.
    pub async fn unmount(&self) {
        {
            let mut st = self.state.write().await;
            if !st.is_mounted() {
                return;
            }
            st.unmount();
        }
        let _ = self.shutdown_tx.send(true);

        let handles = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for result in join_all(handles).await {
            if let Err(e) = result {
                if e.is_panic() {
                    warn!(strip = %self.id, error = %e, "Ticker loop panicked");
                }
            }
        }
        info!(strip = %self.id, "Ticker strip unmounted");
    }
}

impl Drop for TickerStrip {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        let tasks = match self.tasks.get_mut() {
            Ok(tasks) => std::mem::take(tasks),
            Err(poisoned) => std::mem::take(poisoned.into_inner()),
        };
        for handle in tasks {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

async fn poll_loop(
    id: Uuid,
    state: SharedState,
    source: Arc<dyn MarketDataSource>,
    settings: StripSettings,
    mut refresh_rx: mpsc::UnboundedReceiver<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    let limits = FeedLimits {
        max_indices: settings.max_indices,
        max_tape: settings.max_tape,
    };
    let mut ticker = interval(settings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut inflight = JoinSet::new();

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                spawn_fetch(&mut inflight, id, &state, &source, limits).await;
            }
            Some(()) = refresh_rx.recv() => {
                spawn_fetch(&mut inflight, id, &state, &source, limits).await;
            }
            Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        warn!(strip = %id, error = %e, "Market fetch task panicked");
                    }
                }
            }
        }
    }

    inflight.abort_all();
    while inflight.join_next().await.is_some() {}
    trace!(strip = %id, "Poll loop stopped");
}

async fn spawn_fetch(
    inflight: &mut JoinSet<()>,
    id: Uuid,
    state: &SharedState,
    source: &Arc<dyn MarketDataSource>,
    limits: FeedLimits,
) {
    let seq = state.write().await.next_fetch_seq();
    let state = state.clone();
    let source = source.clone();

    inflight.spawn(async move {
        match source.fetch_snapshot().await {
            Ok(snapshot) => {
                let items = build_items(&snapshot, limits);
                let outcome = state
                    .write()
                    .await
                    .apply_fetch(seq, items, Instant::now(), Utc::now());
                match outcome {
                    FetchOutcome::Applied(count) => {
                        info!(strip = %id, seq, items = count, "Ticker refreshed");
                    }
                    FetchOutcome::Empty => {
                        warn!(strip = %id, seq, "Market endpoint returned no instruments; keeping current items");
                    }
                    FetchOutcome::Stale => {
                        debug!(strip = %id, seq, "Discarding stale market response");
                    }
                    FetchOutcome::Unmounted => {}
                }
            }
            Err(e) => {
                warn!(
                    strip = %id,
                    seq,
                    source = source.name(),
                    error = %e,
                    "Market fetch failed; keeping current items"
                );
            }
        }
    });
}

async fn jitter_loop(
    id: Uuid,
    state: SharedState,
    settings: StripSettings,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut jitter = Jitter::new(settings.jitter_seed);
    let period = settings.jitter_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let applied = state.write().await.jitter(
                    &mut jitter,
                    Instant::now(),
                    settings.jitter_suppress_window,
                );
                trace!(strip = %id, applied, "Jitter tick");
            }
        }
    }
}

async fn frame_loop(
    state: SharedState,
    settings: StripSettings,
    mut shutdown: watch::Receiver<bool>,
) {
    let period = settings.frame_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                state.write().await.advance_frame();
            }
        }
    }
}

async fn status_loop(
    id: Uuid,
    state: SharedState,
    calendar: Arc<dyn MarketCalendar>,
    settings: StripSettings,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(settings.status_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<MarketStatus> = None;

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let status = calendar.status_now();
                state.write().await.set_market_status(status);
                if last != Some(status) {
                    debug!(strip = %id, status = %status, "Market status");
                    last = Some(status);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
