//! Evaluator protocol: the optimization state machine.
//!
//! The driver never calls the objective itself. It emits one
//! [`EvaluationRequest`] at a time and suspends until the matching
//! [`EvaluationResponse`] is handed back through [`OptimizationDriver::respond`].
//! How and when the evaluation runs is up to the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::{Result, SearchError};
use crate::schema::{
    Direction, RunState, RunStatus, SearchConfig, SearchEvent, SearchResult, TerminationReason,
    VariableDomain,
};

use super::acceptance::AcceptancePolicy;
use super::convergence::ConvergenceMonitor;
use super::improvise::Improviser;
use super::memory::HarmonyMemory;
use super::rng::HarmonyRng;

/// Cooperative cancellation flag, polled before every request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Role of an evaluation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationTag {
    /// Scoring memory entry `index` during startup.
    MemoryFill { index: usize },
    /// Scoring a freshly improvised candidate.
    Improvisation,
    /// Scoring the starting point or the last accepted point.
    ReportedBest,
}

/// A point the driver wants evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub id: u64,
    pub tag: EvaluationTag,
    pub point: Vec<f64>,
}

impl EvaluationRequest {
    /// Build the response carrying `fitness` for this request.
    pub fn respond(self, fitness: f64) -> EvaluationResponse {
        EvaluationResponse {
            id: self.id,
            tag: self.tag,
            point: self.point,
            fitness,
        }
    }
}

/// The evaluated point, echoed back with its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResponse {
    pub id: u64,
    pub tag: EvaluationTag,
    pub point: Vec<f64>,
    pub fitness: f64,
}

/// What the caller must do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Evaluate this request and pass the response to `respond`.
    Evaluate(EvaluationRequest),
    /// The run is over.
    Finished(SearchResult),
}

/// Driver phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    Initializing,
    FillingMemory,
    Sorting,
    EvaluatingCurrent,
    Improvising,
    AwaitingEvaluation,
    Terminated,
}

/// Harmony search state machine.
pub struct OptimizationDriver {
    domain: VariableDomain,
    dimensions: usize,
    memory_size: usize,
    direction: Direction,
    starting_point: Vec<f64>,
    improviser: Improviser,
    policy: AcceptancePolicy,
    monitor: ConvergenceMonitor,
    rng: HarmonyRng,
    memory: Option<HarmonyMemory>,
    reference: Vec<f64>,
    state: RunState,
    phase: DriverPhase,
    outstanding: Option<EvaluationRequest>,
    next_id: u64,
    cancel: CancelToken,
    events: Vec<SearchEvent>,
    started_at: Option<Instant>,
}

impl OptimizationDriver {
    /// Validate `config` and prepare a run.
    ///
    /// Nothing random happens here: a rejected configuration never touches
    /// the generator.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        config.validate()?;

        if !config.domain.contains(&config.starting_point)? {
            log::warn!(
                "Starting point {:?} lies outside the domain",
                config.starting_point
            );
        }

        let rng = match config.random_seed {
            Some(seed) => HarmonyRng::new(seed),
            None => HarmonyRng::random(),
        };

        Ok(Self {
            domain: config.domain.clone(),
            dimensions: config.dimensions,
            memory_size: config.memory_size,
            direction: config.direction,
            starting_point: config.starting_point.clone(),
            improviser: Improviser::from_config(&config.improvisation),
            policy: AcceptancePolicy::new(config.direction),
            monitor: ConvergenceMonitor::new(&config.termination, config.direction),
            rng,
            memory: None,
            reference: config.starting_point.clone(),
            state: RunState::new(config.starting_point.clone(), config.direction.unscored()),
            phase: DriverPhase::Initializing,
            outstanding: None,
            next_id: 0,
            cancel: CancelToken::new(),
            events: Vec::new(),
            started_at: None,
        })
    }

    /// Use custom rate suppliers.
    pub fn with_improviser(mut self, improviser: Improviser) -> Self {
        self.improviser = improviser;
        self
    }

    /// Current run state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// The harmony memory, once initialized.
    pub fn memory(&self) -> Option<&HarmonyMemory> {
        self.memory.as_ref()
    }

    /// The request awaiting a response, if any.
    pub fn outstanding(&self) -> Option<&EvaluationRequest> {
        self.outstanding.as_ref()
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, SearchEvent> {
        self.events.drain(..)
    }

    /// Initialize the memory and request the first evaluation.
    pub fn start(&mut self, cancel: CancelToken) -> Result<Step> {
        if self.phase != DriverPhase::Initializing {
            return Err(SearchError::ProtocolViolation(
                "Run already started".into(),
            ));
        }

        self.cancel = cancel;
        self.started_at = Some(Instant::now());
        self.state.status = RunStatus::Running;

        let memory = HarmonyMemory::initialize(
            &self.domain,
            self.memory_size,
            self.dimensions,
            self.direction,
            &mut self.rng,
        );
        match memory {
            Ok(memory) => self.memory = Some(memory),
            Err(error) => return Err(self.fail(error)),
        }

        self.phase = DriverPhase::FillingMemory;
        log::debug!(
            "Filling memory of {} entries ({} dimensions)",
            self.memory_size,
            self.dimensions
        );
        self.request_fill(0)
    }

    /// Feed the response to the outstanding request and get the next step.
    ///
    /// A response whose id, tag or point differs from the outstanding request
    /// is rejected with `ProtocolViolation` and leaves the driver unchanged. A
    /// NaN fitness fails the run.
    pub fn respond(&mut self, response: EvaluationResponse) -> Result<Step> {
        let Some(request) = &self.outstanding else {
            return Err(SearchError::ProtocolViolation(format!(
                "No evaluation outstanding (phase {:?})",
                self.phase
            )));
        };
        if request.id != response.id || request.tag != response.tag {
            return Err(SearchError::ProtocolViolation(format!(
                "Response {} ({:?}) does not match request {} ({:?})",
                response.id, response.tag, request.id, request.tag
            )));
        }
        if request.point != response.point {
            return Err(SearchError::ProtocolViolation(format!(
                "Response {} carries a point other than the one requested",
                response.id
            )));
        }
        self.outstanding = None;
        self.state.evaluation_count += 1;

        if response.fitness.is_nan() {
            return Err(self.fail(SearchError::EvaluatorFailure {
                point: response.point,
                reason: "objective returned NaN".into(),
            }));
        }

        let outcome = match response.tag {
            EvaluationTag::MemoryFill { index } => self.on_memory_fill(index, response.fitness),
            EvaluationTag::Improvisation => {
                self.state.iteration_count += 1;
                self.on_candidate(response.point, response.fitness)
            }
            EvaluationTag::ReportedBest => self.on_candidate(response.point, response.fitness),
        };
        outcome.map_err(|error| self.fail(error))
    }

    /// Abort the run with `error`, typically an evaluator failure.
    ///
    /// Returns the error so it can be propagated; the partial result stays
    /// available through [`OptimizationDriver::result`]. A run that already
    /// terminated keeps its termination reason.
    pub fn fail(&mut self, error: SearchError) -> SearchError {
        if self.state.status.is_terminal() {
            log::debug!("Ignoring failure after termination: {error}");
            return error;
        }
        log::info!("Run failed: {error}");
        self.outstanding = None;
        self.finish(TerminationReason::Failed(error.to_string()));
        error
    }

    /// Result built from the current state.
    ///
    /// Before termination the reason reflects the current status
    /// (`Cancelled` for a run that never finished).
    pub fn result(&self) -> SearchResult {
        SearchResult {
            best_point: self.state.best_point.clone(),
            best_value: self.state.best_value,
            termination: self
                .state
                .termination
                .clone()
                .unwrap_or(TerminationReason::Cancelled),
            iterations: self.state.iteration_count,
            evaluations: self.state.evaluation_count,
            accepted: self.state.accepted_count,
            elapsed_seconds: self
                .started_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        }
    }

    fn on_memory_fill(&mut self, index: usize, fitness: f64) -> Result<Step> {
        let memory = self.memory_mut()?;
        memory.set_fitness(index, fitness)?;
        let point = memory.row(index)?;

        if self.direction.is_better(fitness, self.state.best_value) {
            self.state.best_point = point;
            self.state.best_value = fitness;
        }

        if index + 1 < self.memory_size {
            return self.request_fill(index + 1);
        }

        self.phase = DriverPhase::Sorting;
        let memory = self.memory_mut()?;
        memory.sort_worst_to_best();
        let best = memory.best().clone();
        let worst_value = memory.worst().fitness;

        // Filling only ever improves the tracked best, so it matches the memory best.
        self.state.best_point = best.point.clone();
        self.state.best_value = best.fitness;
        self.monitor.observe(&best.point, best.fitness);
        self.events.push(SearchEvent::MemoryFilled {
            best_value: best.fitness,
            worst_value,
        });
        log::debug!(
            "Memory filled: best {:.6e}, worst {:.6e}",
            best.fitness,
            worst_value
        );

        self.phase = DriverPhase::EvaluatingCurrent;
        Ok(self.issue(EvaluationTag::ReportedBest, self.starting_point.clone()))
    }

    fn on_candidate(&mut self, point: Vec<f64>, fitness: f64) -> Result<Step> {
        let memory = self
            .memory
            .as_mut()
            .ok_or_else(|| SearchError::ProtocolViolation("Memory not initialized".into()))?;

        if self.policy.accept(memory, &point, fitness) {
            self.state.accepted_count += 1;
            self.reference = point.clone();

            if self.policy.is_better(fitness, self.state.best_value) {
                self.state.best_point = point.clone();
                self.state.best_value = fitness;
                self.events.push(SearchEvent::NewBest {
                    point: point.clone(),
                    value: fitness,
                    iteration: self.state.iteration_count,
                    evaluation: self.state.evaluation_count,
                });
                log::info!(
                    "New best {:.6e} at iteration {}",
                    fitness,
                    self.state.iteration_count
                );
            }

            self.monitor.observe(&point, fitness);
            return Ok(self.issue(EvaluationTag::ReportedBest, point));
        }

        if let Some(step) = self.poll_termination() {
            return Ok(step);
        }

        self.phase = DriverPhase::Improvising;
        let memory = self
            .memory
            .as_ref()
            .ok_or_else(|| SearchError::ProtocolViolation("Memory not initialized".into()))?;
        let candidate =
            self.improviser
                .improvise(&self.reference, memory, &self.domain, &mut self.rng)?;
        Ok(self.issue(EvaluationTag::Improvisation, candidate))
    }

    fn request_fill(&mut self, index: usize) -> Result<Step> {
        let point = self.memory_mut()?.row(index)?;
        Ok(self.issue(EvaluationTag::MemoryFill { index }, point))
    }

    /// Emit a request unless the run must stop first.
    fn issue(&mut self, tag: EvaluationTag, point: Vec<f64>) -> Step {
        if let Some(step) = self.poll_termination() {
            return step;
        }

        let request = EvaluationRequest {
            id: self.next_id,
            tag,
            point,
        };
        self.next_id += 1;
        log::trace!("Request {} {:?}: {:?}", request.id, request.tag, request.point);

        if !matches!(tag, EvaluationTag::MemoryFill { .. }) {
            self.phase = DriverPhase::AwaitingEvaluation;
        }
        self.outstanding = Some(request.clone());
        Step::Evaluate(request)
    }

    fn poll_termination(&mut self) -> Option<Step> {
        if self.phase == DriverPhase::Terminated {
            return Some(Step::Finished(self.result()));
        }
        let reason = self.monitor.poll(&self.state, self.cancel.is_cancelled())?;
        self.finish(reason);
        Some(Step::Finished(self.result()))
    }

    fn finish(&mut self, reason: TerminationReason) {
        log::info!(
            "Run terminated ({:?}): best {:.6e} after {} iterations, {} evaluations",
            reason,
            self.state.best_value,
            self.state.iteration_count,
            self.state.evaluation_count
        );
        self.state.status = reason.status();
        self.state.termination = Some(reason);
        self.phase = DriverPhase::Terminated;
    }

    fn memory_mut(&mut self) -> Result<&mut HarmonyMemory> {
        self.memory
            .as_mut()
            .ok_or_else(|| SearchError::ProtocolViolation("Memory not initialized".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{StagnationConfig, TerminationConfig};

    fn config(memory_size: usize, max_iterations: u64) -> SearchConfig {
        SearchConfig {
            memory_size,
            domain: VariableDomain::shared(-10.0, 10.0).unwrap(),
            termination: TerminationConfig {
                max_iterations,
                max_evaluations: None,
                stagnation: None,
            },
            random_seed: Some(42),
            ..SearchConfig::new(vec![5.0, 5.0])
        }
    }

    fn sphere(point: &[f64]) -> f64 {
        point.iter().map(|x| x * x).sum()
    }

    fn expect_request(step: Step) -> EvaluationRequest {
        match step {
            Step::Evaluate(request) => request,
            Step::Finished(result) => panic!("unexpected finish: {result:?}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_start() {
        let mut bad = config(5, 10);
        bad.domain = VariableDomain::Shared {
            bounds: serde_json::from_str(r#"{"lower":1.0,"upper":1.0}"#).unwrap(),
        };
        assert!(matches!(
            OptimizationDriver::new(&bad),
            Err(SearchError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn test_fill_sequence() {
        let mut driver = OptimizationDriver::new(&config(4, 10)).unwrap();
        assert_eq!(driver.phase(), DriverPhase::Initializing);

        let mut step = driver.start(CancelToken::new()).unwrap();
        for expected in 0..4 {
            let request = expect_request(step);
            assert_eq!(request.tag, EvaluationTag::MemoryFill { index: expected });
            assert_eq!(driver.phase(), DriverPhase::FillingMemory);
            assert!(driver.outstanding().is_some());
            let f = sphere(&request.point);
            step = driver.respond(request.respond(f)).unwrap();
        }

        let request = expect_request(step);
        assert_eq!(request.tag, EvaluationTag::ReportedBest);
        assert_eq!(request.point, vec![5.0, 5.0]);
        assert_eq!(driver.phase(), DriverPhase::AwaitingEvaluation);

        let memory = driver.memory().unwrap();
        assert!(memory.is_sorted());
        assert_eq!(driver.state().best_value, memory.best().fitness);
        assert_eq!(driver.state().evaluation_count, 4);
        assert!(matches!(
            driver.drain_events().next(),
            Some(SearchEvent::MemoryFilled { .. })
        ));
    }

    #[test]
    fn test_single_outstanding_request() {
        let mut driver = OptimizationDriver::new(&config(3, 10)).unwrap();
        let request = expect_request(driver.start(CancelToken::new()).unwrap());

        // Wrong id.
        let mut forged = request.clone().respond(1.0);
        forged.id += 1;
        assert!(matches!(
            driver.respond(forged),
            Err(SearchError::ProtocolViolation(_))
        ));

        // Wrong tag.
        let mut forged = request.clone().respond(1.0);
        forged.tag = EvaluationTag::Improvisation;
        assert!(driver.respond(forged).is_err());

        // The first request is still outstanding.
        assert_eq!(driver.outstanding(), Some(&request));
        assert_eq!(driver.state().status, RunStatus::Running);
        let next = expect_request(driver.respond(request.clone().respond(1.0)).unwrap());
        assert_eq!(next.tag, EvaluationTag::MemoryFill { index: 1 });

        // Answering twice is a violation.
        assert!(driver.respond(request.respond(1.0)).is_err());
    }

    #[test]
    fn test_response_must_echo_requested_point() {
        let mut driver = OptimizationDriver::new(&config(3, 100)).unwrap();
        let mut step = driver.start(CancelToken::new()).unwrap();
        for _ in 0..3 {
            let request = expect_request(step);
            step = driver.respond(request.respond(100.0)).unwrap();
        }
        let start = expect_request(step);
        let before = driver.state().clone();

        let mut forged = start.clone().respond(1.0);
        forged.point = vec![1e6, -1e6, 7.0];
        assert!(matches!(
            driver.respond(forged),
            Err(SearchError::ProtocolViolation(_))
        ));

        assert_eq!(driver.state(), &before);
        assert_eq!(driver.outstanding(), Some(&start));
        assert!(driver.memory().unwrap().entries().iter().all(|e| e.point.len() == 2));

        let next = expect_request(driver.respond(start.clone().respond(1.0)).unwrap());
        assert_eq!(next.point, start.point);
        assert_eq!(driver.state().best_point, vec![5.0, 5.0]);
    }

    #[test]
    fn test_start_twice_rejected() {
        let mut driver = OptimizationDriver::new(&config(3, 10)).unwrap();
        driver.start(CancelToken::new()).unwrap();
        assert!(matches!(
            driver.start(CancelToken::new()),
            Err(SearchError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_accepted_point_is_reported_again() {
        let mut driver = OptimizationDriver::new(&config(3, 100)).unwrap();
        let mut step = driver.start(CancelToken::new()).unwrap();
        for _ in 0..3 {
            let request = expect_request(step);
            step = driver.respond(request.respond(100.0)).unwrap();
        }

        // Starting point scores better than every memory entry.
        let start = expect_request(step);
        assert_eq!(start.tag, EvaluationTag::ReportedBest);
        let step = driver.respond(start.clone().respond(1.0)).unwrap();

        let echo = expect_request(step);
        assert_eq!(echo.tag, EvaluationTag::ReportedBest);
        assert_eq!(echo.point, start.point);
        assert_eq!(driver.state().best_value, 1.0);
        assert_eq!(driver.state().accepted_count, 1);
        let events: Vec<_> = driver.drain_events().collect();
        assert!(matches!(
            events.last(),
            Some(SearchEvent::NewBest { value, .. }) if *value == 1.0
        ));

        // The echo is already stored, so it is rejected and improvisation begins.
        let next = expect_request(driver.respond(echo.respond(1.0)).unwrap());
        assert_eq!(next.tag, EvaluationTag::Improvisation);
        assert_eq!(driver.state().accepted_count, 1);
    }

    #[test]
    fn test_iteration_budget() {
        let mut driver = OptimizationDriver::new(&config(5, 20)).unwrap();
        let mut step = driver.start(CancelToken::new()).unwrap();
        let result = loop {
            match step {
                Step::Evaluate(request) => {
                    let f = sphere(&request.point);
                    step = driver.respond(request.respond(f)).unwrap();
                }
                Step::Finished(result) => break result,
            }
        };

        assert_eq!(result.termination, TerminationReason::IterationLimit);
        assert_eq!(result.iterations, 20);
        assert_eq!(driver.state().status, RunStatus::Converged);
        assert_eq!(driver.phase(), DriverPhase::Terminated);
        assert!(driver.outstanding().is_none());
    }

    #[test]
    fn test_evaluation_budget() {
        let mut config = config(5, 1_000);
        config.termination.max_evaluations = Some(12);
        let mut driver = OptimizationDriver::new(&config).unwrap();
        let mut step = driver.start(CancelToken::new()).unwrap();
        let result = loop {
            match step {
                Step::Evaluate(request) => {
                    let f = sphere(&request.point);
                    step = driver.respond(request.respond(f)).unwrap();
                }
                Step::Finished(result) => break result,
            }
        };

        assert_eq!(result.termination, TerminationReason::EvaluationLimit);
        assert_eq!(result.evaluations, 12);
    }

    #[test]
    fn test_stagnation_stops_run() {
        let mut config = config(5, 1_000_000);
        config.termination.stagnation = Some(StagnationConfig {
            epsilon: 1e9,
            patience: 1,
        });
        let mut driver = OptimizationDriver::new(&config).unwrap();
        let mut step = driver.start(CancelToken::new()).unwrap();
        let result = loop {
            match step {
                Step::Evaluate(request) => {
                    let f = sphere(&request.point);
                    step = driver.respond(request.respond(f)).unwrap();
                }
                Step::Finished(result) => break result,
            }
        };

        assert_eq!(result.termination, TerminationReason::Converged);
        assert_eq!(result.accepted, 1);
    }

    #[test]
    fn test_nan_fails_run() {
        let mut driver = OptimizationDriver::new(&config(3, 10)).unwrap();
        let request = expect_request(driver.start(CancelToken::new()).unwrap());
        assert!(matches!(
            driver.respond(request.respond(f64::NAN)),
            Err(SearchError::EvaluatorFailure { .. })
        ));
        assert_eq!(driver.state().status, RunStatus::Failed);
        assert!(matches!(
            driver.result().termination,
            TerminationReason::Failed(_)
        ));
        assert_eq!(driver.result().best_point, vec![5.0, 5.0]);
        assert_eq!(driver.result().evaluations, 1);
    }

    #[test]
    fn test_fail_after_finish_keeps_termination() {
        let mut driver = OptimizationDriver::new(&config(3, 5)).unwrap();
        let mut step = driver.start(CancelToken::new()).unwrap();
        while let Step::Evaluate(request) = step {
            let f = sphere(&request.point);
            step = driver.respond(request.respond(f)).unwrap();
        }
        assert_eq!(driver.state().status, RunStatus::Converged);

        let error = driver.fail(SearchError::InvalidConfig("late".into()));
        assert!(matches!(error, SearchError::InvalidConfig(_)));
        assert_eq!(driver.state().status, RunStatus::Converged);
        assert_eq!(
            driver.state().termination,
            Some(TerminationReason::IterationLimit)
        );
    }

    #[test]
    fn test_cancel_before_start_returns_starting_point() {
        let mut driver = OptimizationDriver::new(&config(3, 10)).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        match driver.start(cancel).unwrap() {
            Step::Finished(result) => {
                assert_eq!(result.termination, TerminationReason::Cancelled);
                assert_eq!(result.best_point, vec![5.0, 5.0]);
                assert_eq!(result.evaluations, 0);
            }
            Step::Evaluate(_) => panic!("cancelled run issued a request"),
        }
        assert_eq!(driver.state().status, RunStatus::Cancelled);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let config = config(10, 200);
        let mut a = OptimizationDriver::new(&config).unwrap();
        let mut b = OptimizationDriver::new(&config).unwrap();

        let mut step_a = a.start(CancelToken::new()).unwrap();
        let mut step_b = b.start(CancelToken::new()).unwrap();
        loop {
            assert_eq!(a.state(), b.state());
            match (step_a, step_b) {
                (Step::Evaluate(ra), Step::Evaluate(rb)) => {
                    assert_eq!(ra, rb);
                    let f = sphere(&ra.point);
                    step_a = a.respond(ra.respond(f)).unwrap();
                    step_b = b.respond(rb.respond(f)).unwrap();
                }
                (Step::Finished(ra), Step::Finished(rb)) => {
                    assert_eq!(ra.best_point, rb.best_point);
                    assert_eq!(ra.termination, rb.termination);
                    break;
                }
                _ => panic!("trajectories diverged"),
            }
        }
        assert_eq!(a.state().iteration_count, 200);
    }

    #[test]
    fn test_cancel_mid_run() {
        let mut driver = OptimizationDriver::new(&config(5, 10_000)).unwrap();
        let cancel = CancelToken::new();
        let mut step = driver.start(cancel.clone()).unwrap();
        let mut best_at_cancel = f64::INFINITY;

        let result = loop {
            match step {
                Step::Evaluate(request) => {
                    if driver.state().iteration_count == 30 && !cancel.is_cancelled() {
                        best_at_cancel = driver.state().best_value;
                        cancel.cancel();
                    }
                    let f = sphere(&request.point);
                    step = driver.respond(request.respond(f)).unwrap();
                }
                Step::Finished(result) => break result,
            }
        };

        assert_eq!(result.termination, TerminationReason::Cancelled);
        assert!(result.best_value <= best_at_cancel);
        assert!(result.iterations <= 31);
        assert_eq!(driver.state().status, RunStatus::Cancelled);
    }

    #[test]
    fn test_maximize_tracks_largest() {
        let mut config = config(4, 50);
        config.direction = Direction::Maximize;
        let mut driver = OptimizationDriver::new(&config).unwrap();
        let mut step = driver.start(CancelToken::new()).unwrap();
        let mut seen = f64::NEG_INFINITY;
        let result = loop {
            match step {
                Step::Evaluate(request) => {
                    let f = -sphere(&request.point);
                    seen = seen.max(f);
                    step = driver.respond(request.respond(f)).unwrap();
                }
                Step::Finished(result) => break result,
            }
        };

        assert_eq!(result.best_value, seen);
        assert_eq!(driver.memory().unwrap().best().fitness, seen);
    }
}
