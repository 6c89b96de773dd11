//! Ticker entry: render one item as display strings plus its link.

use serde::Serialize;
use std::fmt;

use crate::types::{InstrumentType, TickerItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }
}

/// A fully formatted ticker entry, ready for any front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub change_percent: String,
    pub direction: Direction,
    pub href: String,
}

impl TickerEntry {
    pub fn from_item(item: &TickerItem) -> Self {
        let decimals = match item.kind() {
            InstrumentType::Currency => 4,
            _ => 2,
        };
        let direction = if item.is_up() { Direction::Up } else { Direction::Down };

        Self {
            symbol: item.symbol().to_string(),
            name: item.name().to_string(),
            price: group_thousands(item.price(), decimals),
            change: signed(item.change(), decimals, item.is_up()),
            change_percent: format!("{}%", signed(item.change_percent(), 2, item.is_up())),
            direction,
            href: item.href(),
        }
    }
}

impl fmt::Display for TickerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} ({})",
            self.symbol,
            self.price,
            self.direction.arrow(),
            self.change,
            self.change_percent
        )
    }
}

/// `1234567.891` → `1,234,567.89`.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut out = String::with_capacity(raw.len() + int_part.len() / 3 + 1);
    if value < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Sign follows the item's direction so a rounded `0.00` still agrees with the arrow.
fn signed(value: f64, decimals: usize, is_up: bool) -> String {
    let sign = if is_up { '+' } else { '-' };
    format!("{sign}{}", group_thousands(value.abs(), decimals))
}
