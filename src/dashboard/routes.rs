//! Dashboard API route handlers.
//!
//! Reads go through `TickerStrip::snapshot`; writes map to the strip's
//! manual controls. A strip that has been unmounted answers `410 Gone`.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::calendar::{ExchangeCalendar, MarketCalendar};
use crate::ticker::entry::TickerEntry;
use crate::ticker::state::TickerSnapshot;
use crate::ticker::TickerStrip;
use crate::types::{MarketStatus, TickerError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub strip: Arc<TickerStrip>,
    pub calendar: Arc<ExchangeCalendar>,
}

impl DashboardState {
    pub fn new(strip: Arc<TickerStrip>, calendar: Arc<ExchangeCalendar>) -> Self {
        Self { strip, calendar }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TickerView {
    /// Rendered entries for the doubled belt.
    pub entries: Vec<TickerEntry>,
    pub item_count: usize,
    pub offset: f64,
    pub loop_width: f64,
    pub paused: bool,
    pub hovered: bool,
    pub manually_paused: bool,
    pub market_status: MarketStatus,
    pub market_status_label: String,
    pub last_fetched_at: Option<String>,
    pub revision: u64,
}

impl From<&TickerSnapshot> for TickerView {
    fn from(snap: &TickerSnapshot) -> Self {
        Self {
            entries: snap.loop_items.iter().map(TickerEntry::from_item).collect(),
            item_count: snap.items.len(),
            offset: snap.offset,
            loop_width: snap.loop_width,
            paused: snap.paused,
            hovered: snap.hovered,
            manually_paused: snap.manually_paused,
            market_status: snap.market_status,
            market_status_label: snap.market_status.label().to_string(),
            last_fetched_at: snap.last_fetched_at.map(|t| t.to_rfc3339()),
            revision: snap.revision,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PauseResponse {
    pub paused: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoverRequest {
    pub hovered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketStatusResponse {
    pub status: MarketStatus,
    pub label: String,
    pub is_trading: bool,
    pub minutes_to_next_change: Option<i64>,
}

fn status_for(err: TickerError) -> StatusCode {
    match err {
        TickerError::Unmounted => StatusCode::GONE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/ticker
pub async fn get_ticker(State(state): State<AppState>) -> Json<TickerView> {
    let snap = state.strip.snapshot().await;
    Json(TickerView::from(&snap))
}

/// POST /api/ticker/pause
pub async fn toggle_pause(
    State(state): State<AppState>,
) -> Result<Json<PauseResponse>, StatusCode> {
    let paused = state.strip.toggle_pause().await.map_err(status_for)?;
    Ok(Json(PauseResponse { paused }))
}

/// POST /api/ticker/hover
pub async fn set_hover(
    State(state): State<AppState>,
    Json(req): Json<HoverRequest>,
) -> StatusCode {
    match state.strip.set_hovered(req.hovered).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => status_for(e),
    }
}

/// POST /api/ticker/refresh
pub async fn refresh(State(state): State<AppState>) -> StatusCode {
    match state.strip.refresh().await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => status_for(e),
    }
}

/// GET /api/market-status
pub async fn get_market_status(State(state): State<AppState>) -> Json<MarketStatusResponse> {
    let now = Utc::now();
    let status = state.calendar.status_at(now);
    Json(MarketStatusResponse {
        status,
        label: status.label().to_string(),
        is_trading: status.is_trading(),
        minutes_to_next_change: state.calendar.minutes_to_next_change(now),
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
