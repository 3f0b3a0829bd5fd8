//! Synchronous runner: drives the evaluator protocol with an in-process objective.

use crate::error::{Result, RunFailure, SearchError};
use crate::schema::{SearchConfig, SearchEvent, SearchResult};

use super::driver::{CancelToken, OptimizationDriver, Step};
use super::improvise::Improviser;
use super::objective::Objective;

/// Runs one harmony search to completion.
pub struct HarmonySearch {
    driver: OptimizationDriver,
    cancel: CancelToken,
}

impl HarmonySearch {
    /// Create a new search. Fails if `config` is invalid.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            driver: OptimizationDriver::new(config)?,
            cancel: CancelToken::new(),
        })
    }

    /// Use custom rate suppliers.
    pub fn with_improviser(mut self, improviser: Improviser) -> Self {
        self.driver = self.driver.with_improviser(improviser);
        self
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run, reporting every [`SearchEvent`] to `callback`.
    pub fn run_with_callback<O, F>(
        mut self,
        mut objective: O,
        mut callback: F,
    ) -> std::result::Result<SearchResult, RunFailure>
    where
        O: Objective,
        F: FnMut(&SearchEvent),
    {
        let mut step = self
            .driver
            .start(self.cancel.clone())
            .map_err(|error| self.failure(error))?;

        loop {
            for event in self.driver.drain_events() {
                callback(&event);
            }

            let request = match step {
                Step::Finished(result) => return Ok(result),
                Step::Evaluate(request) => request,
            };

            let fitness = match objective.evaluate(&request.point) {
                Ok(fitness) => fitness,
                Err(err) => {
                    let error = self.driver.fail(SearchError::EvaluatorFailure {
                        point: request.point,
                        reason: err.to_string(),
                    });
                    return Err(self.failure(error));
                }
            };

            step = self
                .driver
                .respond(request.respond(fitness))
                .map_err(|error| self.failure(error))?;
        }
    }

    /// Run (blocking).
    pub fn run<O: Objective>(self, objective: O) -> std::result::Result<SearchResult, RunFailure> {
        self.run_with_callback(objective, |_| {})
    }

    fn failure(&self, error: SearchError) -> RunFailure {
        RunFailure {
            error,
            partial: self.driver.result(),
        }
    }
}
