//! Standard test functions with known minima.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{ImprovisationConfig, RateConfig, SearchConfig, VariableDomain};

/// Built-in benchmark objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Benchmark {
    /// `sum(x_i^2)` on `[-100, 100]`.
    Sphere,
    /// `0.26 (x^2 + y^2) - 0.48 x y` on `[-10, 10]`.
    Matyas,
    /// Lévy function N.13 on `[-10, 10]`, minimum at `(1, 1)`.
    Levi13,
    /// Himmelblau's function on `[-5, 5]`, four global minima.
    Himmelblau,
}

impl Benchmark {
    pub const ALL: [Benchmark; 4] = [
        Benchmark::Sphere,
        Benchmark::Matyas,
        Benchmark::Levi13,
        Benchmark::Himmelblau,
    ];

    /// Function value at `point`.
    ///
    /// Two-variable functions return NaN for points of any other length.
    pub fn evaluate(&self, point: &[f64]) -> f64 {
        match (self, point) {
            (Self::Sphere, _) => point.iter().map(|x| x * x).sum(),
            (Self::Matyas, &[x, y]) => 0.26 * (x * x + y * y) - 0.48 * x * y,
            (Self::Levi13, &[x, y]) => {
                let sin3x = (3.0 * PI * x).sin().powi(2);
                let sin3y = (3.0 * PI * y).sin().powi(2);
                let sin2y = (2.0 * PI * y).sin().powi(2);
                sin3x + (x - 1.0).powi(2) * (1.0 + sin3y) + (y - 1.0).powi(2) * (1.0 + sin2y)
            }
            (Self::Himmelblau, &[x, y]) => {
                (x * x + y - 11.0).powi(2) + (x + y * y - 7.0).powi(2)
            }
            _ => f64::NAN,
        }
    }

    /// Search domain the function is usually studied on.
    pub fn domain(&self) -> Result<VariableDomain> {
        let (lower, upper) = match self {
            Self::Sphere => (-100.0, 100.0),
            Self::Matyas | Self::Levi13 => (-10.0, 10.0),
            Self::Himmelblau => (-5.0, 5.0),
        };
        VariableDomain::shared(lower, upper)
    }

    /// Search configuration over this benchmark's domain.
    ///
    /// The rates favour memory recall and small pitch steps, which these
    /// smooth test functions need to converge tightly. The generic defaults
    /// (0.5 / 0.5 / full width) stay close to random search.
    pub fn config(&self, starting_point: Vec<f64>) -> Result<SearchConfig> {
        Ok(SearchConfig {
            domain: self.domain()?,
            improvisation: ImprovisationConfig {
                memory_rate: RateConfig::Constant { value: 0.95 },
                pitch_adjust_rate: RateConfig::Constant { value: 0.7 },
                pitch_width: RateConfig::Constant { value: 1e-3 },
            },
            ..SearchConfig::new(starting_point)
        })
    }

    pub fn dimensions(&self) -> usize {
        2
    }

    /// Global minimum value.
    pub fn minimum(&self) -> f64 {
        0.0
    }

    /// Points where the global minimum is attained.
    pub fn solutions(&self) -> Vec<Vec<f64>> {
        match self {
            Self::Sphere | Self::Matyas => vec![vec![0.0, 0.0]],
            Self::Levi13 => vec![vec![1.0, 1.0]],
            Self::Himmelblau => vec![
                vec![3.0, 2.0],
                vec![-2.805118, 3.131312],
                vec![-3.779310, -3.283186],
                vec![3.584428, -1.848126],
            ],
        }
    }

    /// Distance from `point` to the closest known solution.
    pub fn distance_to_solution(&self, point: &[f64]) -> f64 {
        self.solutions()
            .iter()
            .map(|s| super::convergence::euclidean_distance(s, point))
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_at_solutions() {
        for benchmark in Benchmark::ALL {
            for solution in benchmark.solutions() {
                let value = benchmark.evaluate(&solution);
                assert!(
                    (value - benchmark.minimum()).abs() < 1e-6,
                    "{benchmark:?} at {solution:?} = {value}"
                );
                assert!(benchmark.domain().unwrap().contains(&solution).unwrap());
            }
        }
    }

    #[test]
    fn test_positive_elsewhere() {
        for benchmark in Benchmark::ALL {
            assert!(benchmark.evaluate(&[0.5, -0.75]) > benchmark.minimum());
        }
    }

    #[test]
    fn test_wrong_length() {
        assert!(Benchmark::Matyas.evaluate(&[1.0]).is_nan());
        assert_eq!(Benchmark::Sphere.evaluate(&[1.0, 2.0, 3.0]), 14.0);
    }

    #[test]
    fn test_distance_to_solution() {
        assert_eq!(Benchmark::Levi13.distance_to_solution(&[1.0, 4.0]), 3.0);
        assert!(Benchmark::Himmelblau.distance_to_solution(&[3.0, 2.0]) < 1e-12);
    }

    #[test]
    fn test_config_uses_domain() {
        let config = Benchmark::Himmelblau.config(vec![1.0, 1.0]).unwrap();
        assert_eq!(config.dimensions, 2);
        assert_eq!(config.domain, VariableDomain::shared(-5.0, 5.0).unwrap());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.improvisation.memory_rate,
            RateConfig::Constant { value: 0.95 }
        );
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Benchmark::Levi13).unwrap();
        assert_eq!(json, "\"Levi13\"");
        let parsed: Benchmark = serde_json::from_str("\"Himmelblau\"").unwrap();
        assert_eq!(parsed, Benchmark::Himmelblau);
    }
}
