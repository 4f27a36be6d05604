//! Fixed-rate frame scheduling.
//!
//! Headless hosts have no display refresh callback, so frames are driven by
//! a tokio interval instead. A tick that arrives late is skipped rather than
//! replayed in a burst.

use std::time::Duration;

use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

/// Emits one tick per animation frame at a fixed rate.
#[derive(Debug)]
pub struct FrameTicker {
    interval: Interval,
    period: Duration,
}

impl FrameTicker {
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next frame. The first tick completes immediately.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}
