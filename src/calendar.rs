//! Trading-session calendar.
//!
//! Purely derived from wall-clock time against a fixed weekday/hour table.
//! Decorative: nothing downstream treats it as the source of truth for
//! whether an exchange is trading. No public holidays.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Offset, Timelike, Utc, Weekday};

use crate::types::MarketStatus;

/// Anything that can say what session an exchange is in at a given instant.
pub trait MarketCalendar: Send + Sync {
    fn status_at(&self, at: DateTime<Utc>) -> MarketStatus;

    fn status_now(&self) -> MarketStatus {
        self.status_at(Utc::now())
    }
}

/// One row of the session table, in exchange-local time.
#[derive(Debug, Clone, Copy)]
struct Session {
    start: NaiveTime,
    end: NaiveTime,
    status: MarketStatus,
}

/// Fixed-offset exchange calendar with a single weekday session table.
#[derive(Debug, Clone)]
pub struct ExchangeCalendar {
    offset: FixedOffset,
    sessions: Vec<Session>,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

impl ExchangeCalendar {
    /// Johannesburg: UTC+2 all year.
    /// 08:30 pre-open, 09:00 continuous trading, 16:50 closing auction, 17:00 close.
    pub fn jse() -> Self {
        let sast = FixedOffset::east_opt(2 * 3600).unwrap_or_else(|| Utc.fix());
        Self {
            offset: sast,
            sessions: vec![
                Session { start: hm(8, 30), end: hm(9, 0), status: MarketStatus::PreOpen },
                Session { start: hm(9, 0), end: hm(16, 50), status: MarketStatus::Open },
                Session { start: hm(16, 50), end: hm(17, 0), status: MarketStatus::ClosingAuction },
            ],
        }
    }

    /// Minutes until the next session boundary, for display hints.
    pub fn minutes_to_next_change(&self, at: DateTime<Utc>) -> Option<i64> {
        let local = at.with_timezone(&self.offset);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return None;
        }
        let now = local.time();
        self.sessions
            .iter()
            .flat_map(|s| [s.start, s.end])
            .filter(|t| *t > now)
            .min()
            .map(|t| {
                let secs = t.num_seconds_from_midnight() as i64 - now.num_seconds_from_midnight() as i64;
                (secs + 59) / 60
            })
    }
}

impl Default for ExchangeCalendar {
    fn default() -> Self {
        Self::jse()
    }
}

impl MarketCalendar for ExchangeCalendar {
    fn status_at(&self, at: DateTime<Utc>) -> MarketStatus {
        let local = at.with_timezone(&self.offset);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketStatus::Weekend;
        }

        let now = local.time();
        self.sessions
            .iter()
            .find(|s| now >= s.start && now < s.end)
            .map(|s| s.status)
            .unwrap_or(MarketStatus::Closed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
