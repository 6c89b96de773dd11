//! Horizontal scroll loop.
//!
//! The strip renders its items twice back-to-back. The offset advances a
//! fixed number of pixels per frame and snaps back to zero once it has
//! travelled across one copy, which reads as an endless belt.

use serde::Serialize;

/// Total width of the doubled list.
pub fn loop_width(item_count: usize, item_width_px: f64) -> f64 {
    2.0 * item_count as f64 * item_width_px
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollState {
    offset: f64,
    px_per_frame: f64,
    hovered: bool,
    manually_paused: bool,
}

impl ScrollState {
    pub fn new(px_per_frame: f64) -> Self {
        Self {
            offset: 0.0,
            px_per_frame,
            hovered: false,
            manually_paused: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn manually_paused(&self) -> bool {
        self.manually_paused
    }

    /// Either pause source stops the belt.
    pub fn is_paused(&self) -> bool {
        self.hovered || self.manually_paused
    }

    /// Flip the manual pause. Returns the new manual-pause state.
    pub fn toggle_pause(&mut self) -> bool {
        self.manually_paused = !self.manually_paused;
        self.manually_paused
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Advance one frame across a belt of `total_width` pixels.
    ///
    /// Returns the new offset. No-op while paused.
    pub fn advance(&mut self, total_width: f64) -> f64 {
        if self.is_paused() {
            return self.offset;
        }

        let half = total_width / 2.0;
        if half <= 0.0 {
            self.offset = 0.0;
            return self.offset;
        }

        let next = self.offset + self.px_per_frame;
        self.offset = if next >= half { 0.0 } else { next };
        self.offset
    }
}
