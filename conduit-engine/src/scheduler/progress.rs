//! Progress driver
//!
//! Steps a percentage from 0 to 100 on a fixed interval. Canary rollouts
//! and terraform applies each run their own instance.

use std::time::Duration;
use tokio::time::{self, Instant};

use crate::config::SimulationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressDriver {
    step: u8,
    interval: Duration,
}

impl ProgressDriver {
    /// `step` is clamped to 1..=100 and `interval` to at least 1ms
    pub fn new(step: u8, interval: Duration) -> Self {
        Self {
            step: step.clamp(1, 100),
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.progress_step, config.progress_interval)
    }

    /// Number of ticks needed to reach 100
    pub fn ticks(&self) -> u32 {
        u32::from(100u8.div_ceil(self.step))
    }

    /// Total time from start to 100
    pub fn total_duration(&self) -> Duration {
        self.interval * self.ticks()
    }

    /// Runs to completion, reporting every new percentage
    ///
    /// The first tick lands one interval after the call; the last reported
    /// value is always exactly 100.
    pub async fn run(&self, mut on_tick: impl FnMut(u8)) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        let mut progress: u8 = 0;

        while progress < 100 {
            ticker.tick().await;
            progress = progress.saturating_add(self.step).min(100);
            on_tick(progress);
        }
    }
}
