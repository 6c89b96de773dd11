//! tickerstrip: live market ticker strip.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! mounts a ticker strip against the configured market endpoint, serves
//! the dashboard, and unmounts cleanly on Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use tickerstrip::calendar::ExchangeCalendar;
use tickerstrip::config;
use tickerstrip::dashboard::{self, routes::DashboardState};
use tickerstrip::feed::http::HttpMarketFeed;
use tickerstrip::ticker::entry::TickerEntry;
use tickerstrip::ticker::TickerStrip;

/// How often the headless log line prints when the dashboard is off.
const LOG_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("TICKERSTRIP_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    info!(
        endpoint = %cfg.feed.base_url,
        path = %cfg.feed.path,
        poll_secs = cfg.ticker.poll_interval_secs,
        dashboard = cfg.dashboard.enabled,
        "tickerstrip starting up"
    );

    // -- Initialise components -------------------------------------------

    let api_key = cfg.feed_api_key();
    if cfg.feed.api_key_env.is_some() && api_key.is_none() {
        warn!("Feed API key env var not set; using unauthenticated reads");
    }
    let feed = HttpMarketFeed::from_config(&cfg.feed, api_key)?;
    info!(url = %feed.url(), "Market feed configured");

    let settings = cfg.ticker.settings()?;
    let calendar = Arc::new(ExchangeCalendar::jse());
    let strip = Arc::new(TickerStrip::mount(settings, Arc::new(feed), calendar.clone()));

    let server = if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(strip.clone(), calendar));
        Some(dashboard::spawn_dashboard(state, cfg.dashboard.port).await?)
    } else {
        None
    };

    // -- Main loop -------------------------------------------------------

    let mut log_tick = tokio::time::interval(LOG_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Ticker running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = log_tick.tick() => {
                if server.is_none() {
                    log_strip(&strip).await;
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    strip.unmount().await;
    if let Some(handle) = server {
        handle.abort();
    }
    info!("tickerstrip shut down cleanly.");

    Ok(())
}

/// Print the strip as one line per entry (headless mode).
async fn log_strip(strip: &TickerStrip) {
    let snap = strip.snapshot().await;
    info!(
        items = snap.items.len(),
        offset = format!("{:.1}", snap.offset),
        status = %snap.market_status,
        revision = snap.revision,
        "Ticker state"
    );
    for item in &snap.items {
        info!("  {}", TickerEntry::from_item(item));
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tickerstrip=info"));

    let json_logging = std::env::var("TICKERSTRIP_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
