//! Improvisation: generating a new candidate from the harmony memory.
//!
//! Each dimension independently picks one of three operators:
//!
//! - **Random draw**: a fresh uniform value from the dimension's bounds
//! - **Memory recall**: the value stored in a random memory row
//! - **Pitch adjustment**: the reference value shifted by a bounded random step

use std::fmt;

use crate::error::{Result, SearchError};
use crate::schema::{ImprovisationConfig, RateConfig, VariableDomain};

use super::memory::HarmonyMemory;
use super::rng::HarmonyRng;

/// Supplier of a per-dimension probability or width in `[0, 1]`.
pub trait Rate: Send + Sync {
    /// Value for `dimension`. Random suppliers draw from `rng`.
    fn evaluate(&self, dimension: usize, rng: &mut HarmonyRng) -> f64;
}

/// Same value everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantRate(pub f64);

impl Rate for ConstantRate {
    fn evaluate(&self, _dimension: usize, _rng: &mut HarmonyRng) -> f64 {
        self.0
    }
}

/// Fresh uniform value from `[0, 1)` on every call.
#[derive(Debug, Clone, Copy)]
pub struct UniformRate;

impl Rate for UniformRate {
    fn evaluate(&self, _dimension: usize, rng: &mut HarmonyRng) -> f64 {
        rng.unit()
    }
}

impl RateConfig {
    /// Build the supplier described by this config.
    pub fn build(&self) -> Box<dyn Rate> {
        match self {
            Self::Constant { value } => Box::new(ConstantRate(*value)),
            Self::Uniform => Box::new(UniformRate),
        }
    }
}

fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Generates candidate vectors from the memory.
pub struct Improviser {
    memory_rate: Box<dyn Rate>,
    pitch_adjust_rate: Box<dyn Rate>,
    pitch_width: Box<dyn Rate>,
}

impl fmt::Debug for Improviser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Improviser").finish_non_exhaustive()
    }
}

impl Improviser {
    /// Create from explicit rate suppliers.
    pub fn new(
        memory_rate: Box<dyn Rate>,
        pitch_adjust_rate: Box<dyn Rate>,
        pitch_width: Box<dyn Rate>,
    ) -> Self {
        Self {
            memory_rate,
            pitch_adjust_rate,
            pitch_width,
        }
    }

    /// Create from the serializable config.
    pub fn from_config(config: &ImprovisationConfig) -> Self {
        Self::new(
            config.memory_rate.build(),
            config.pitch_adjust_rate.build(),
            config.pitch_width.build(),
        )
    }

    /// Replace the memory consideration rate.
    pub fn with_memory_rate(mut self, rate: impl Rate + 'static) -> Self {
        self.memory_rate = Box::new(rate);
        self
    }

    /// Replace the pitch adjustment rate.
    pub fn with_pitch_adjust_rate(mut self, rate: impl Rate + 'static) -> Self {
        self.pitch_adjust_rate = Box::new(rate);
        self
    }

    /// Replace the pitch width.
    pub fn with_pitch_width(mut self, rate: impl Rate + 'static) -> Self {
        self.pitch_width = Box::new(rate);
        self
    }

    /// Improvise one candidate around `reference`.
    ///
    /// Every component of the result lies inside `domain`.
    pub fn improvise(
        &self,
        reference: &[f64],
        memory: &HarmonyMemory,
        domain: &VariableDomain,
        rng: &mut HarmonyRng,
    ) -> Result<Vec<f64>> {
        let dimensions = memory.dimensions();
        if reference.len() != dimensions {
            return Err(SearchError::DimensionMismatch {
                field: "reference point",
                expected: dimensions,
                actual: reference.len(),
            });
        }

        let mut candidate = Vec::with_capacity(dimensions);
        for (j, &current) in reference.iter().enumerate() {
            let bounds = domain.bounds(j)?;

            let u1 = rng.unit();
            if u1 >= unit_clamp(self.memory_rate.evaluate(j, rng)) {
                candidate.push(domain.sample(j, rng)?);
                continue;
            }

            let u2 = rng.unit();
            if u2 >= unit_clamp(self.pitch_adjust_rate.evaluate(j, rng)) {
                let row = rng.index(memory.len());
                candidate.push(memory.recall(row, j)?);
                continue;
            }

            let width = unit_clamp(self.pitch_width.evaluate(j, rng));
            let step = rng.signed_unit() * width * bounds.width();
            let adjusted = pitch_adjust(current, step, bounds.lower(), bounds.upper());
            candidate.push(bounds.normalize(adjusted));
        }

        Ok(candidate)
    }
}

/// Shift `value` by `step`, reflecting the step when it leaves the bounds.
///
/// The result may still be infeasible when both directions overshoot; the
/// caller clamps it.
fn pitch_adjust(value: f64, step: f64, lower: f64, upper: f64) -> f64 {
    let adjusted = value + step;
    if adjusted > upper {
        value - step
    } else if adjusted < lower {
        value + step.abs()
    } else {
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Direction;
    use proptest::prelude::*;

    fn memory(domain: &VariableDomain, size: usize, dims: usize, seed: u64) -> HarmonyMemory {
        let mut rng = HarmonyRng::new(seed);
        HarmonyMemory::initialize(domain, size, dims, Direction::Minimize, &mut rng).unwrap()
    }

    fn improviser(memory_rate: f64, pitch_rate: f64, width: f64) -> Improviser {
        Improviser::new(
            Box::new(ConstantRate(memory_rate)),
            Box::new(ConstantRate(pitch_rate)),
            Box::new(ConstantRate(width)),
        )
    }

    #[test]
    fn test_pitch_adjust_reflects() {
        assert_eq!(pitch_adjust(0.0, 0.5, -1.0, 1.0), 0.5);
        assert_eq!(pitch_adjust(0.75, 0.5, -1.0, 1.0), 0.25);
        assert_eq!(pitch_adjust(-0.75, -0.5, -1.0, 1.0), -0.25);
        // Both directions overshoot: left for the caller to clamp.
        assert_eq!(pitch_adjust(0.0, 5.0, -1.0, 1.0), -5.0);
    }

    #[test]
    fn test_pure_recall_copies_memory_values() {
        let domain = VariableDomain::shared(-10.0, 10.0).unwrap();
        let memory = memory(&domain, 5, 4, 11);
        let mut rng = HarmonyRng::new(5);
        let candidate = improviser(1.0, 0.0, 0.1)
            .improvise(&[0.0; 4], &memory, &domain, &mut rng)
            .unwrap();

        for (j, value) in candidate.iter().enumerate() {
            assert!(memory.entries().iter().any(|e| e.point[j] == *value));
        }
    }

    #[test]
    fn test_pure_random_stays_in_bounds() {
        let domain = VariableDomain::per_dimension(&[(0.0, 1.0), (100.0, 200.0)]).unwrap();
        let memory = memory(&domain, 3, 2, 2);
        let mut rng = HarmonyRng::new(8);
        let imp = improviser(0.0, 0.0, 0.0);

        for _ in 0..100 {
            let candidate = imp.improvise(&[0.5, 150.0], &memory, &domain, &mut rng).unwrap();
            assert!(domain.contains(&candidate).unwrap());
        }
    }

    #[test]
    fn test_pitch_adjustment_is_local() {
        let domain = VariableDomain::shared(-100.0, 100.0).unwrap();
        let memory = memory(&domain, 5, 3, 4);
        let mut rng = HarmonyRng::new(9);
        let imp = improviser(1.0, 1.0, 0.001);
        let reference = [10.0, -20.0, 30.0];

        for _ in 0..100 {
            let candidate = imp.improvise(&reference, &memory, &domain, &mut rng).unwrap();
            for (c, r) in candidate.iter().zip(&reference) {
                assert!((c - r).abs() <= 0.2 + 1e-12);
            }
        }
    }

    #[test]
    fn test_reference_length_checked() {
        let domain = VariableDomain::default();
        let memory = memory(&domain, 3, 2, 1);
        let mut rng = HarmonyRng::new(1);
        assert!(matches!(
            improviser(0.5, 0.5, 0.5).improvise(&[0.0], &memory, &domain, &mut rng),
            Err(SearchError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_candidate() {
        let domain = VariableDomain::default();
        let memory = memory(&domain, 10, 5, 3);
        let imp = Improviser::from_config(&ImprovisationConfig {
            memory_rate: RateConfig::Uniform,
            ..Default::default()
        });

        let a = imp
            .improvise(&[1.0; 5], &memory, &domain, &mut HarmonyRng::new(77))
            .unwrap();
        let b = imp
            .improvise(&[1.0; 5], &memory, &domain, &mut HarmonyRng::new(77))
            .unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn improvised_components_stay_in_bounds(
            seed in any::<u64>(),
            memory_rate in 0.0f64..=1.0,
            pitch_rate in 0.0f64..=1.0,
            width in 0.0f64..=1.0,
            reference in proptest::collection::vec(-1e3f64..1e3, 3),
        ) {
            let domain =
                VariableDomain::per_dimension(&[(-1.0, 1.0), (0.0, 50.0), (-7.5, -2.5)]).unwrap();
            let memory = memory(&domain, 8, 3, seed);
            let mut rng = HarmonyRng::new(seed.wrapping_add(1));
            let candidate = improviser(memory_rate, pitch_rate, width)
                .improvise(&reference, &memory, &domain, &mut rng)
                .unwrap();
            prop_assert!(domain.contains(&candidate).unwrap());
        }
    }
}
