//! tickerstrip: live market ticker strip engine.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod feed;
pub mod ticker;
pub mod types;
