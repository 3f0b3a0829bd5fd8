//! Convergence and termination tracking.

use crate::schema::{Direction, RunState, StagnationConfig, TerminationConfig, TerminationReason};

/// Monitor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    /// Nothing observed yet.
    Initial,
    /// Following the best point.
    Tracking,
    /// Stagnation detected.
    Converged,
}

/// Tracks the best point and decides when a run is over.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    phase: MonitorPhase,
    direction: Direction,
    best_point: Vec<f64>,
    best_value: f64,
    stagnant: usize,
    stagnation: Option<StagnationConfig>,
    max_iterations: u64,
    max_evaluations: Option<u64>,
}

impl ConvergenceMonitor {
    pub fn new(config: &TerminationConfig, direction: Direction) -> Self {
        Self {
            phase: MonitorPhase::Initial,
            direction,
            best_point: Vec::new(),
            best_value: direction.unscored(),
            stagnant: 0,
            stagnation: config.stagnation,
            max_iterations: config.max_iterations,
            max_evaluations: config.max_evaluations,
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    /// Best point observed, if any.
    pub fn best(&self) -> Option<(&[f64], f64)> {
        match self.phase {
            MonitorPhase::Initial => None,
            _ => Some((&self.best_point, self.best_value)),
        }
    }

    /// Record a new point.
    ///
    /// The distance to the previous best is measured before the best is
    /// updated. Once `patience` consecutive points land closer than
    /// `epsilon`, the monitor converges.
    pub fn observe(&mut self, point: &[f64], value: f64) -> MonitorPhase {
        match self.phase {
            MonitorPhase::Initial => {
                self.best_point = point.to_vec();
                self.best_value = value;
                self.phase = MonitorPhase::Tracking;
            }
            MonitorPhase::Tracking => {
                let distance = euclidean_distance(&self.best_point, point);

                if self.direction.is_better(value, self.best_value) {
                    self.best_point = point.to_vec();
                    self.best_value = value;
                }

                if let Some(stagnation) = self.stagnation {
                    if distance < stagnation.epsilon {
                        self.stagnant += 1;
                    } else {
                        self.stagnant = 0;
                    }
                    if self.stagnant >= stagnation.patience {
                        self.phase = MonitorPhase::Converged;
                    }
                }
            }
            MonitorPhase::Converged => {}
        }
        self.phase
    }

    /// Decide whether the run must stop now.
    ///
    /// Cancellation wins over everything else, then stagnation, then the
    /// iteration and evaluation budgets.
    pub fn poll(&self, state: &RunState, cancelled: bool) -> Option<TerminationReason> {
        if cancelled {
            return Some(TerminationReason::Cancelled);
        }

        if self.phase == MonitorPhase::Converged {
            return Some(TerminationReason::Converged);
        }

        if state.iteration_count >= self.max_iterations {
            return Some(TerminationReason::IterationLimit);
        }

        if let Some(limit) = self.max_evaluations
            && state.evaluation_count >= limit
        {
            return Some(TerminationReason::EvaluationLimit);
        }

        None
    }
}

/// Euclidean norm of `a - b`.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
