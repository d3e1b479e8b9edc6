//! Scroll velocity meter.
//!
//! Terminal input has no native scroll velocity, so one is derived from the
//! spacing of scroll samples: `items / seconds since the previous sample`.
//! After a quiet period with no samples the meter reports exactly zero, which
//! is the only value that ends placeholder rendering.

use std::time::{Duration, Instant};

/// Samples further apart than this are treated as a fresh gesture.
const IDLE: Duration = Duration::from_millis(200);
/// Lower bound on sample spacing; key auto-repeat can deliver bursts.
const MIN_SPACING: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Default)]
pub struct ScrollMeter {
    last_sample: Option<Instant>,
    velocity: f32,
}

impl ScrollMeter {
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Records a scroll of `delta` items at `now` and returns the new velocity
    /// in items per second (signed like `delta`).
    pub fn record(&mut self, delta: i64, now: Instant) -> f32 {
        let spacing = match self.last_sample {
            Some(prev) => now.saturating_duration_since(prev).clamp(MIN_SPACING, IDLE),
            None => IDLE,
        };
        self.last_sample = Some(now);
        self.velocity = delta as f32 / spacing.as_secs_f32();
        self.velocity
    }

    /// Called on every logic tick. Returns `true` when motion has just come to
    /// rest, i.e. the velocity dropped to zero on this tick.
    pub fn settle(&mut self, now: Instant) -> bool {
        let Some(prev) = self.last_sample else {
            return false;
        };
        if self.velocity != 0.0 && now.saturating_duration_since(prev) >= IDLE {
            self.velocity = 0.0;
            self.last_sample = None;
            return true;
        }
        false
    }
}
