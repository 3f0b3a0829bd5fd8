//! Independent runs from several starting points.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::error::{Result, RunFailure};
use crate::schema::{Direction, SearchConfig, SearchResult};

use super::objective::Objective;
use super::search::HarmonySearch;

/// Outcome of a single start.
pub type StartOutcome = std::result::Result<SearchResult, RunFailure>;

/// Run one search per starting point.
///
/// Start `i` uses `config` with its starting point replaced and its seed
/// offset by `i`, and evaluates with `make_objective(i)`. Every derived
/// config is validated before any run begins. Outcomes are returned in the
/// order of `starts`.
pub fn multi_start<O, F>(
    config: &SearchConfig,
    starts: &[Vec<f64>],
    make_objective: F,
) -> Result<Vec<StartOutcome>>
where
    O: Objective,
    F: Fn(usize) -> O + Sync,
{
    let searches = starts
        .iter()
        .enumerate()
        .map(|(i, start)| {
            HarmonySearch::new(&SearchConfig {
                starting_point: start.clone(),
                random_seed: config.random_seed.map(|seed| seed.wrapping_add(i as u64)),
                ..config.clone()
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Running {} independent starts", searches.len());
    Ok(run_all(searches, &make_objective))
}

#[cfg(not(target_arch = "wasm32"))]
fn run_all<O, F>(searches: Vec<HarmonySearch>, make_objective: &F) -> Vec<StartOutcome>
where
    O: Objective,
    F: Fn(usize) -> O + Sync,
{
    searches
        .into_par_iter()
        .enumerate()
        .map(|(i, search)| run_one(i, search, make_objective))
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn run_all<O, F>(searches: Vec<HarmonySearch>, make_objective: &F) -> Vec<StartOutcome>
where
    O: Objective,
    F: Fn(usize) -> O + Sync,
{
    searches
        .into_iter()
        .enumerate()
        .map(|(i, search)| run_one(i, search, make_objective))
        .collect()
}

fn run_one<O, F>(index: usize, search: HarmonySearch, make_objective: &F) -> StartOutcome
where
    O: Objective,
    F: Fn(usize) -> O,
{
    let outcome = search.run(make_objective(index));
    match &outcome {
        Ok(result) => log::debug!(
            "Start {index} finished ({:?}): best {:.6e}",
            result.termination,
            result.best_value
        ),
        Err(failure) => log::warn!("Start {index} failed: {failure}"),
    }
    outcome
}

/// Best successful result, if any start succeeded.
pub fn best_of(outcomes: &[StartOutcome], direction: Direction) -> Option<&SearchResult> {
    outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok())
        .reduce(|best, result| {
            if direction.is_better(result.best_value, best.best_value) {
                result
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::benchmark::Benchmark;
    use crate::compute::objective::{BoxError, Fallible};
    use crate::error::SearchError;

    fn config() -> SearchConfig {
        let mut config = Benchmark::Levi13.config(vec![0.0, 0.0]).unwrap();
        config.memory_size = 20;
        config.termination.max_iterations = 2_000;
        config.random_seed = Some(7);
        config
    }

    #[test]
    fn test_one_outcome_per_start() {
        let starts = vec![vec![10.0, 10.0], vec![9.0, 9.0], vec![2.0, 7.8]];
        let outcomes = multi_start(&config(), &starts, |_| {
            |x: &[f64]| Benchmark::Levi13.evaluate(x)
        })
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.is_ok()));
        let best = best_of(&outcomes, Direction::Minimize).unwrap();
        for outcome in &outcomes {
            assert!(best.best_value <= outcome.as_ref().unwrap().best_value);
        }
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let starts = vec![vec![1.0, 1.0], vec![-3.0, 4.0]];
        let objective = |_: usize| |x: &[f64]| Benchmark::Levi13.evaluate(x);
        let a = multi_start(&config(), &starts, objective).unwrap();
        let b = multi_start(&config(), &starts, objective).unwrap();

        for (a, b) in a.iter().zip(&b) {
            let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
            assert_eq!(a.best_point, b.best_point);
            assert_eq!(a.evaluations, b.evaluations);
        }
    }

    #[test]
    fn test_bad_start_rejected_up_front() {
        let starts = vec![vec![1.0, 1.0], vec![1.0]];
        let result = multi_start(&config(), &starts, |_| |x: &[f64]| x[0]);
        assert!(matches!(
            result,
            Err(SearchError::DimensionMismatch {
                field: "starting_point",
                ..
            })
        ));
    }

    #[test]
    fn test_failed_start_does_not_hide_others() {
        let starts = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
        let outcomes = multi_start(&config(), &starts, |i| {
            Fallible(move |x: &[f64]| -> std::result::Result<f64, BoxError> {
                if i == 1 {
                    Err("unavailable".into())
                } else {
                    Ok(Benchmark::Levi13.evaluate(x))
                }
            })
        })
        .unwrap();

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        let best = best_of(&outcomes, Direction::Minimize).unwrap();
        assert_eq!(best, outcomes[0].as_ref().unwrap());
    }

    #[test]
    fn test_best_of_empty() {
        assert!(best_of(&[], Direction::Maximize).is_none());
    }
}
