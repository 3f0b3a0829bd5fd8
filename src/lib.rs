//! Harmony Search - Derivative-free global optimization.
//!
//! This crate implements the harmony search metaheuristic for continuous,
//! box-constrained objective functions. A fixed-size memory of scored
//! candidates is improved by improvising new candidates from it, one
//! dimension at a time, and replacing the worst entry whenever a candidate
//! beats it.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, domains, run state and results
//! - `compute`: Memory, improvisation, acceptance, convergence and drivers
//!
//! The core is [`compute::OptimizationDriver`], a state machine that emits
//! one evaluation request at a time and waits for its response, so the
//! objective may live anywhere. [`compute::HarmonySearch`] drives it with an
//! in-process objective.
//!
//! # Example
//!
//! ```rust,no_run
//! use harmony_search::{compute::HarmonySearch, schema::SearchConfig};
//!
//! let mut config = SearchConfig::new(vec![10.0, 10.0]);
//! config.random_seed = Some(42);
//!
//! let result = HarmonySearch::new(&config)?
//!     .run(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>())?;
//!
//! println!("Best {:?} = {:.3e}", result.best_point, result.best_value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compute;
pub mod error;
pub mod schema;

// Re-export commonly used types
pub use compute::{CancelToken, HarmonySearch, Objective, OptimizationDriver};
pub use error::{Result, RunFailure, SearchError};
pub use schema::{SearchConfig, SearchResult, VariableDomain};
