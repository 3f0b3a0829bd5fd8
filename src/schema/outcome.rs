//! Run status, progress events and results.

use serde::{Deserialize, Serialize};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[default]
    NotStarted,
    Running,
    /// Finished normally: stagnation detected or a budget exhausted.
    Converged,
    Cancelled,
    Failed,
}

impl RunStatus {
    /// Whether the run has left `Running` for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::Cancelled | Self::Failed)
    }
}

/// Reason a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Reached the improvisation budget.
    IterationLimit,
    /// Reached the evaluation budget.
    EvaluationLimit,
    /// Accepted points stopped moving.
    Converged,
    /// Cancellation token raised.
    Cancelled,
    /// Error occurred.
    Failed(String),
}

impl TerminationReason {
    pub(crate) fn status(&self) -> RunStatus {
        match self {
            Self::IterationLimit | Self::EvaluationLimit | Self::Converged => RunStatus::Converged,
            Self::Cancelled => RunStatus::Cancelled,
            Self::Failed(_) => RunStatus::Failed,
        }
    }
}

/// Mutable state of a run, owned by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub status: RunStatus,
    /// Best point known so far.
    pub best_point: Vec<f64>,
    /// Fitness of `best_point` (the unscored sentinel until something is evaluated).
    pub best_value: f64,
    /// Improvisations evaluated.
    pub iteration_count: u64,
    /// Evaluations of any kind.
    pub evaluation_count: u64,
    /// Candidates that replaced a memory entry.
    pub accepted_count: u64,
    /// Set once the run is terminal.
    pub termination: Option<TerminationReason>,
}

impl RunState {
    pub(crate) fn new(starting_point: Vec<f64>, unscored: f64) -> Self {
        Self {
            status: RunStatus::NotStarted,
            best_point: starting_point,
            best_value: unscored,
            iteration_count: 0,
            evaluation_count: 0,
            accepted_count: 0,
            termination: None,
        }
    }
}

/// Event reported to the caller while the run progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchEvent {
    /// The memory was fully scored and sorted.
    MemoryFilled { best_value: f64, worst_value: f64 },
    /// The best known point changed (a major iteration).
    NewBest {
        point: Vec<f64>,
        value: f64,
        iteration: u64,
        evaluation: u64,
    },
}

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_point: Vec<f64>,
    pub best_value: f64,
    pub termination: TerminationReason,
    /// Improvisations evaluated.
    pub iterations: u64,
    /// Evaluations of any kind.
    pub evaluations: u64,
    /// Candidates accepted into memory.
    pub accepted: u64,
    /// Wall-clock time (in seconds).
    pub elapsed_seconds: f64,
}
