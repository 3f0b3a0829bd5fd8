//! Random number generation for memory initialization and improvisation.

use rand::prelude::*;

use crate::error::Result;
use crate::schema::{Bounds, VariableDomain};

/// Seeded random number generator shared by every stochastic step of a run.
pub struct HarmonyRng {
    rng: StdRng,
}

impl HarmonyRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniform draw from `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Uniform draw from `[-1, 1)`.
    #[inline]
    pub fn signed_unit(&mut self) -> f64 {
        self.rng.gen_range(-1.0..1.0)
    }

    /// Uniform draw from the closed interval of `bounds`.
    #[inline]
    pub fn uniform(&mut self, bounds: Bounds) -> f64 {
        self.rng.gen_range(bounds.lower()..=bounds.upper())
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

impl VariableDomain {
    /// Uniform draw from the bounds of `dimension`.
    pub fn sample(&self, dimension: usize, rng: &mut HarmonyRng) -> Result<f64> {
        Ok(rng.uniform(self.bounds(dimension)?))
    }
}
