//! Injectable randomness
//!
//! Every random draw in the simulation (spawn points, target headings, level
//! jitter) goes through `RandomSource`, so a seed reproduces a whole session.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform random numbers
pub trait RandomSource {
    /// Uniform sample in [0, 1)
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in [lo, hi)
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_unit()
    }
}

/// Seeded PCG generator used for real sessions
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Replays a fixed list of samples in a loop (for tests and scripted demos)
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    samples: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        if self.samples.is_empty() {
            return 0.5;
        }
        let value = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }
}
