//! Run configuration and the documented input limits.
//!
//! RULE: the core never sees raw user input. Settings pass through
//! `clamp_dimension` / `clamp_speed` (or `LifeConfig::validated`) first.

use serde::{Deserialize, Serialize};

pub const MIN_GRID_SIZE: u32 = 3;
pub const MAX_GRID_SIZE: u32 = 1000;
pub const DEFAULT_GRID_WIDTH: u32 = 20;
pub const DEFAULT_GRID_HEIGHT: u32 = 20;

/// Delay between generations, in milliseconds.
pub const MIN_SPEED_MS: u64 = 10;
pub const MAX_SPEED_MS: u64 = 5000;
pub const DEFAULT_SPEED_MS: u64 = 200;

pub const DEFAULT_DENSITY: f64 = 0.3;
pub const DEFAULT_SEED: u64 = 42;

pub fn clamp_dimension(size: i64) -> u32 {
    size.clamp(MIN_GRID_SIZE as i64, MAX_GRID_SIZE as i64) as u32
}

pub fn clamp_speed(speed_ms: i64) -> u64 {
    speed_ms.clamp(MIN_SPEED_MS as i64, MAX_SPEED_MS as i64) as u64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    pub width:    i64,
    pub height:   i64,
    pub speed_ms: i64,
    /// Probability a cell starts alive when randomising.
    pub density:  f64,
    pub seed:     u64,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            width:    DEFAULT_GRID_WIDTH as i64,
            height:   DEFAULT_GRID_HEIGHT as i64,
            speed_ms: DEFAULT_SPEED_MS as i64,
            density:  DEFAULT_DENSITY,
            seed:     DEFAULT_SEED,
        }
    }
}

/// A LifeConfig after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedConfig {
    pub width:    u32,
    pub height:   u32,
    pub speed_ms: u64,
    pub density:  f64,
    pub seed:     u64,
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        LifeConfig::default().validated()
    }
}

impl LifeConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: LifeConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    pub fn validated(&self) -> ValidatedConfig {
        ValidatedConfig {
            width:    clamp_dimension(self.width),
            height:   clamp_dimension(self.height),
            speed_ms: clamp_speed(self.speed_ms),
            density:  if self.density.is_finite() { self.density.clamp(0.0, 1.0) } else { DEFAULT_DENSITY },
            seed:     self.seed,
        }
    }
}
