//! Box constraints for the decision variables.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Inclusive interval `[lower, upper]` for a single variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    lower: f64,
    upper: f64,
}

impl Bounds {
    /// Create bounds, rejecting empty, inverted or non-finite intervals.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        let bounds = Self { lower, upper };
        bounds.check()?;
        Ok(bounds)
    }

    fn check(&self) -> Result<()> {
        if self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper {
            Ok(())
        } else {
            Err(SearchError::InvalidDomain {
                lower: self.lower,
                upper: self.upper,
            })
        }
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Interval width (`upper - lower`).
    #[inline]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check whether `value` lies inside the interval.
    #[inline]
    pub fn validate(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Clamp `value` to the nearest bound.
    ///
    /// NaN is mapped to the lower bound so the result is always feasible.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.lower;
        }
        value.clamp(self.lower, self.upper)
    }
}

/// Feasible region of the objective.
///
/// Either one interval shared by every dimension, or one interval per
/// dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VariableDomain {
    /// Same bounds for all dimensions.
    Shared { bounds: Bounds },
    /// Individual bounds per dimension.
    PerDimension { bounds: Vec<Bounds> },
}

impl Default for VariableDomain {
    fn default() -> Self {
        Self::Shared {
            bounds: Bounds {
                lower: -100.0,
                upper: 100.0,
            },
        }
    }
}

impl VariableDomain {
    /// Domain applying `[lower, upper]` to every dimension.
    pub fn shared(lower: f64, upper: f64) -> Result<Self> {
        Ok(Self::Shared {
            bounds: Bounds::new(lower, upper)?,
        })
    }

    /// Domain with one `(lower, upper)` pair per dimension.
    pub fn per_dimension(pairs: &[(f64, f64)]) -> Result<Self> {
        let bounds = pairs
            .iter()
            .map(|&(lower, upper)| Bounds::new(lower, upper))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::PerDimension { bounds })
    }

    /// Bounds of `dimension`.
    ///
    /// The shared variant never fails; the per-dimension variant returns
    /// `OutOfRange` past its last interval.
    pub fn bounds(&self, dimension: usize) -> Result<Bounds> {
        match self {
            Self::Shared { bounds } => Ok(*bounds),
            Self::PerDimension { bounds } => {
                bounds
                    .get(dimension)
                    .copied()
                    .ok_or(SearchError::OutOfRange {
                        index: dimension,
                        len: bounds.len(),
                    })
            }
        }
    }

    /// Check whether `value` is feasible for `dimension`.
    pub fn validate(&self, dimension: usize, value: f64) -> Result<bool> {
        Ok(self.bounds(dimension)?.validate(value))
    }

    /// Clamp `value` into the bounds of `dimension`.
    pub fn normalize(&self, dimension: usize, value: f64) -> Result<f64> {
        Ok(self.bounds(dimension)?.normalize(value))
    }

    /// Check whether every component of `point` is feasible.
    pub fn contains(&self, point: &[f64]) -> Result<bool> {
        for (j, &value) in point.iter().enumerate() {
            if !self.validate(j, value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Ensure a per-dimension domain covers exactly `dimensions` variables.
    pub fn check_dimensions(&self, dimensions: usize) -> Result<()> {
        match self {
            Self::Shared { .. } => Ok(()),
            Self::PerDimension { bounds } if bounds.len() == dimensions => Ok(()),
            Self::PerDimension { bounds } => Err(SearchError::DimensionMismatch {
                field: "domain",
                expected: dimensions,
                actual: bounds.len(),
            }),
        }
    }

    /// Re-check interval invariants, e.g. after deserialization.
    pub fn validate_bounds(&self) -> Result<()> {
        match self {
            Self::Shared { bounds } => bounds.check(),
            Self::PerDimension { bounds } => bounds.iter().try_for_each(Bounds::check),
        }
    }
}
