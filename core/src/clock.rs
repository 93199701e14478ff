//! Run clock: owns the running flag and the inter-generation delay.

use crate::config::{clamp_speed, DEFAULT_SPEED_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunClock {
    pub speed_ms: u64,
    pub running:  bool,
}

impl Default for RunClock {
    fn default() -> Self {
        Self { speed_ms: DEFAULT_SPEED_MS, running: false }
    }
}

impl RunClock {
    pub fn new(speed_ms: u64) -> Self {
        Self { speed_ms: clamp_speed(speed_ms as i64), running: false }
    }

    pub fn start(&mut self) { self.running = true;  }
    pub fn stop(&mut self)  { self.running = false; }

    /// Set the delay, clamped to the documented range. Returns the value applied.
    pub fn set_speed(&mut self, speed_ms: i64) -> u64 {
        self.speed_ms = clamp_speed(speed_ms);
        self.speed_ms
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }
}
