//! Configuration types for a harmony search run.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::VariableDomain;
use crate::error::{Result, SearchError};

/// Top-level search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of decision variables.
    pub dimensions: usize,
    /// Number of harmonies kept in memory.
    #[serde(default = "default_memory_size")]
    pub memory_size: usize,
    /// Feasible region.
    #[serde(default)]
    pub domain: VariableDomain,
    /// Improvisation rates.
    #[serde(default)]
    pub improvisation: ImprovisationConfig,
    /// Budgets and stagnation detection.
    #[serde(default)]
    pub termination: TerminationConfig,
    /// Search for a minimum or a maximum.
    #[serde(default)]
    pub direction: Direction,
    /// Point evaluated right after the memory is filled.
    pub starting_point: Vec<f64>,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(vec![0.0; 2])
    }
}

impl SearchConfig {
    /// Configuration with default settings, sized after `starting_point`.
    pub fn new(starting_point: Vec<f64>) -> Self {
        Self {
            dimensions: starting_point.len(),
            memory_size: default_memory_size(),
            domain: VariableDomain::default(),
            improvisation: ImprovisationConfig::default(),
            termination: TerminationConfig::default(),
            direction: Direction::default(),
            starting_point,
            random_seed: None,
        }
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(SearchError::InvalidConfig(
                "Dimension count must be non-zero".into(),
            ));
        }
        if self.memory_size == 0 {
            return Err(SearchError::InvalidConfig(
                "Memory size must be non-zero".into(),
            ));
        }

        self.domain.validate_bounds()?;
        self.domain.check_dimensions(self.dimensions)?;

        if self.starting_point.len() != self.dimensions {
            return Err(SearchError::DimensionMismatch {
                field: "starting_point",
                expected: self.dimensions,
                actual: self.starting_point.len(),
            });
        }
        if self.starting_point.iter().any(|v| !v.is_finite()) {
            return Err(SearchError::InvalidConfig(
                "Starting point must be finite".into(),
            ));
        }

        self.improvisation.memory_rate.validate("memory_rate")?;
        self.improvisation
            .pitch_adjust_rate
            .validate("pitch_adjust_rate")?;
        self.improvisation.pitch_width.validate("pitch_width")?;

        self.termination.validate(self.memory_size)
    }
}

fn default_memory_size() -> usize {
    50
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

impl Direction {
    /// Whether `candidate` is strictly better than `reference`.
    #[inline]
    pub fn is_better(self, candidate: f64, reference: f64) -> bool {
        match self {
            Self::Minimize => candidate < reference,
            Self::Maximize => candidate > reference,
        }
    }

    /// Fitness carried by entries that have not been evaluated yet.
    #[inline]
    pub fn unscored(self) -> f64 {
        match self {
            Self::Minimize => f64::INFINITY,
            Self::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Ordering that puts the worse fitness first.
    #[inline]
    pub fn worst_first(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Minimize => b.total_cmp(&a),
            Self::Maximize => a.total_cmp(&b),
        }
    }
}

/// Per-dimension probabilities and step width used by improvisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovisationConfig {
    /// Probability of taking a value from memory instead of a random one.
    #[serde(default = "default_memory_rate")]
    pub memory_rate: RateConfig,
    /// Probability of pitch-adjusting instead of recalling verbatim.
    #[serde(default = "default_pitch_adjust_rate")]
    pub pitch_adjust_rate: RateConfig,
    /// Pitch step as a fraction of the domain width.
    #[serde(default = "default_pitch_width")]
    pub pitch_width: RateConfig,
}

impl Default for ImprovisationConfig {
    fn default() -> Self {
        Self {
            memory_rate: default_memory_rate(),
            pitch_adjust_rate: default_pitch_adjust_rate(),
            pitch_width: default_pitch_width(),
        }
    }
}

fn default_memory_rate() -> RateConfig {
    RateConfig::Constant { value: 0.5 }
}
fn default_pitch_adjust_rate() -> RateConfig {
    RateConfig::Constant { value: 0.5 }
}
fn default_pitch_width() -> RateConfig {
    RateConfig::Constant { value: 1.0 }
}

/// Serializable form of a rate supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RateConfig {
    /// Same value for every dimension and draw.
    Constant { value: f64 },
    /// Fresh uniform draw from `[0, 1)` every time.
    Uniform,
}

impl RateConfig {
    fn validate(&self, name: &str) -> Result<()> {
        match self {
            Self::Constant { value } if !(0.0..=1.0).contains(value) => Err(
                SearchError::InvalidConfig(format!("{name} ({value}) must lie in [0, 1]")),
            ),
            _ => Ok(()),
        }
    }
}

/// Termination triggers.
///
/// The iteration budget is always active; the evaluation budget and the
/// stagnation check are optional and independent of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminationConfig {
    /// Maximum number of improvisations evaluated.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// Maximum number of evaluations of any kind, memory fill included.
    #[serde(default)]
    pub max_evaluations: Option<u64>,
    /// Stop once accepted points stop moving away from the best.
    #[serde(default = "default_stagnation")]
    pub stagnation: Option<StagnationConfig>,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_evaluations: None,
            stagnation: default_stagnation(),
        }
    }
}

impl TerminationConfig {
    fn validate(&self, memory_size: usize) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(SearchError::InvalidConfig(
                "max_iterations must be positive".into(),
            ));
        }
        if let Some(limit) = self.max_evaluations
            && limit <= memory_size as u64
        {
            return Err(SearchError::InvalidConfig(format!(
                "max_evaluations ({limit}) must exceed memory_size ({memory_size})"
            )));
        }
        if let Some(stagnation) = &self.stagnation {
            if !(stagnation.epsilon > 0.0) {
                return Err(SearchError::InvalidConfig(format!(
                    "Convergence epsilon ({}) must be positive",
                    stagnation.epsilon
                )));
            }
            if stagnation.patience == 0 {
                return Err(SearchError::InvalidConfig(
                    "Stagnation patience must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}

fn default_max_iterations() -> u64 {
    100_000
}
fn default_stagnation() -> Option<StagnationConfig> {
    Some(StagnationConfig::default())
}

/// Distance-based stagnation detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StagnationConfig {
    /// Distance below which a new point counts as "not moving".
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Consecutive non-moving observations required to stop.
    #[serde(default = "default_patience")]
    pub patience: usize,
}

impl Default for StagnationConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            patience: default_patience(),
        }
    }
}

fn default_epsilon() -> f64 {
    1e-3
}
fn default_patience() -> usize {
    10
}
