//! Uniform random numbers for the photon engine.
//!
//! Every worker owns its own generator; nothing here is shared between threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// A stream of doubles uniformly distributed in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

/// The generator used by the simulation driver.
pub struct McRng {
    seed: u64,
    rng: StdRng,
}

impl McRng {
    pub fn seeded(seed: u64) -> McRng {
        McRng { seed, rng: StdRng::seed_from_u64(seed) }
    }

    /// Independent stream for one job of a run.
    pub fn for_job(base_seed: u64, job: u64) -> McRng {
        McRng::seeded(base_seed.wrapping_add(job))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl UniformSource for McRng {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Seconds since the epoch, used when no seed is configured.
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    values: Vec<f64>,
    next: usize,
}

impl ReplaySource {
    pub fn new(values: Vec<f64>) -> ReplaySource {
        assert!(!values.is_empty(), "replay source needs at least one value");
        ReplaySource { values, next: 0 }
    }

    pub fn constant(value: f64) -> ReplaySource {
        ReplaySource::new(vec![value])
    }
}

impl UniformSource for ReplaySource {
    fn next_uniform(&mut self) -> f64 {
        let v = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        v
    }
}
