//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The feed API key is referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::types::TickerError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub feed: FeedConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// Scheme + host of the market-data backend, e.g. `http://localhost:8000`.
    pub base_url: String,
    #[serde(default = "default_feed_path")]
    pub path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Env var holding the API key. Missing var means unauthenticated reads.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

/// Timing and layout knobs for the strip. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TickerConfig {
    pub poll_interval_secs: u64,
    pub jitter_interval_secs: u64,
    pub jitter_suppress_secs: u64,
    pub frame_interval_ms: u64,
    pub scroll_px_per_frame: f64,
    pub item_width_px: f64,
    pub status_interval_secs: u64,
    pub max_indices: usize,
    pub max_tape: usize,
    /// Fixed RNG seed for the jitter loop; random when unset.
    pub jitter_seed: Option<u64>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            jitter_interval_secs: 5,
            jitter_suppress_secs: 10,
            frame_interval_ms: 16,
            scroll_px_per_frame: 0.5,
            item_width_px: 180.0,
            status_interval_secs: 60,
            max_indices: 5,
            max_tape: 15,
            jitter_seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { enabled: true, port: 8088 }
    }
}

fn default_feed_path() -> String {
    "/api/markets/ticker/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Runtime settings
// ---------------------------------------------------------------------------

/// Validated, `Duration`-typed view of [`TickerConfig`] consumed by the strip.
#[derive(Debug, Clone)]
pub struct StripSettings {
    pub poll_interval: Duration,
    pub jitter_interval: Duration,
    pub jitter_suppress_window: Duration,
    pub frame_interval: Duration,
    pub scroll_px_per_frame: f64,
    pub item_width_px: f64,
    pub status_interval: Duration,
    pub max_indices: usize,
    pub max_tape: usize,
    pub jitter_seed: Option<u64>,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            jitter_interval: Duration::from_secs(5),
            jitter_suppress_window: Duration::from_secs(10),
            frame_interval: Duration::from_millis(16),
            scroll_px_per_frame: 0.5,
            item_width_px: 180.0,
            status_interval: Duration::from_secs(60),
            max_indices: 5,
            max_tape: 15,
            jitter_seed: None,
        }
    }
}

impl TickerConfig {
    /// Validate and convert into runtime settings.
    pub fn settings(&self) -> Result<StripSettings, TickerError> {
        let nonzero = |name: &str, v: u64| {
            if v == 0 {
                Err(TickerError::Config(format!("{name} must be greater than zero")))
            } else {
                Ok(v)
            }
        };

        let poll = nonzero("poll_interval_secs", self.poll_interval_secs)?;
        let jitter = nonzero("jitter_interval_secs", self.jitter_interval_secs)?;
        let frame = nonzero("frame_interval_ms", self.frame_interval_ms)?;
        let status = nonzero("status_interval_secs", self.status_interval_secs)?;

        if !(self.scroll_px_per_frame.is_finite() && self.scroll_px_per_frame > 0.0) {
            return Err(TickerError::Config(
                "scroll_px_per_frame must be a positive number".into(),
            ));
        }
        if !(self.item_width_px.is_finite() && self.item_width_px > 0.0) {
            return Err(TickerError::Config("item_width_px must be a positive number".into()));
        }

        Ok(StripSettings {
            poll_interval: Duration::from_secs(poll),
            jitter_interval: Duration::from_secs(jitter),
            jitter_suppress_window: Duration::from_secs(self.jitter_suppress_secs),
            frame_interval: Duration::from_millis(frame),
            scroll_px_per_frame: self.scroll_px_per_frame,
            item_width_px: self.item_width_px,
            status_interval: Duration::from_secs(status),
            max_indices: self.max_indices,
            max_tape: self.max_tape,
            jitter_seed: self.jitter_seed,
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.ticker.settings()?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// The feed API key, if one is configured and present in the environment.
    pub fn feed_api_key(&self) -> Option<SecretString> {
        self.feed
            .api_key_env
            .as_deref()
            .and_then(|env| Self::resolve_env(env).ok())
            .filter(|key| !key.is_empty())
            .map(SecretString::new)
    }
}
