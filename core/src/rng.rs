//! Deterministic random number generation.
//!
//! RULE: grid randomisation never calls a platform RNG.
//! Every random fill flows through a LifeRng seeded from the run
//! configuration, so the same seed always produces the same grid.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct LifeRng {
    seed:  u64,
    inner: Pcg64Mcg,
}

impl LifeRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// A fresh stream derived from this one's seed and a stable index.
    /// Used to give each randomisation within a run its own stream.
    pub fn derive(&self, index: u64) -> Self {
        Self::new(self.seed ^ index.wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
