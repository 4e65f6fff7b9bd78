//! RNG module - seeded randomness for gem selection
//!
//! Wraps a `SmallRng` so the same seed always produces the same board and
//! the same cascade, which keeps tests and replays deterministic.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Seeded RNG used by setup, refill and the bomb policies
#[derive(Debug, Clone)]
pub struct GemRng {
    rng: SmallRng,
    seed: u64,
}

impl GemRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an RNG from OS entropy, remembering the drawn seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, max)`; 0 when `max` is 0
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }

    /// True with probability `percent` / 100
    pub fn chance(&mut self, percent: f32) -> bool {
        self.rng.gen_range(0.0f32..100.0) < percent
    }

    /// Uniformly pick one element
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }
}
