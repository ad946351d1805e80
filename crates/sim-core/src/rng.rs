//! Randomness source injected into every stochastic operation.
//!
//! Production code uses [`SimRng`], a seeded ChaCha stream whose position can
//! be checkpointed into a save game. Tests can swap in `FixedRandom` (feature
//! `test-utils`) to pin every draw.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The draws the simulation needs. All ranges are inclusive.
pub trait Randomness {
    /// Uniform float in `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
    /// Uniform integer in `[low, high]`.
    fn int_between(&mut self, low: i32, high: i32) -> i32;
    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
    /// Uniform index in `0..len`; returns 0 when `len` is 0.
    fn pick(&mut self, len: usize) -> usize;
}

/// Position of a [`SimRng`] stream, enough to resume it exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngCheckpoint {
    pub seed: u64,
    pub word_pos: u64,
}

/// Deterministic simulation RNG.
#[derive(Clone, Debug)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn checkpoint(&self) -> RngCheckpoint {
        RngCheckpoint {
            seed: self.seed,
            word_pos: u64::try_from(self.inner.get_word_pos()).unwrap_or(u64::MAX),
        }
    }

    pub fn from_checkpoint(checkpoint: RngCheckpoint) -> Self {
        let mut rng = Self::new(checkpoint.seed);
        rng.inner.set_word_pos(u128::from(checkpoint.word_pos));
        rng
    }
}

impl Randomness for SimRng {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    fn int_between(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.inner.gen::<f64>() < probability
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }
}

/// Test double mapping every draw from one unit value `u` in `[0, 1]`:
/// ranges yield `low + u * (high - low)` and `chance(p)` is `u < p`.
///
/// `FixedRandom::midpoint()` therefore gives a 1.0 multiplier for
/// `uniform(0.8, 1.2)`, 0 for `int_between(-5, 5)` and never fires a 20%
/// chance.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedRandom {
    unit: f64,
}

#[cfg(any(test, feature = "test-utils"))]
impl FixedRandom {
    pub fn new(unit: f64) -> Self {
        Self {
            unit: unit.clamp(0.0, 1.0),
        }
    }

    pub fn midpoint() -> Self {
        Self::new(0.5)
    }

    /// Every integer draw lands on its lower bound and every chance fires.
    pub fn lowest() -> Self {
        Self::new(0.0)
    }

    /// Every integer draw lands on its upper bound and no chance fires.
    pub fn highest() -> Self {
        Self::new(1.0)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Randomness for FixedRandom {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low * (1.0 - self.unit) + high * self.unit
    }

    fn int_between(&mut self, low: i32, high: i32) -> i32 {
        low + (f64::from(high - low) * self.unit).round() as i32
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.unit < probability
    }

    fn pick(&mut self, len: usize) -> usize {
        ((len as f64 * self.unit) as usize).min(len.saturating_sub(1))
    }
}
