//! Compute module - Harmony search machinery.

mod acceptance;
mod benchmark;
mod convergence;
mod driver;
mod improvise;
mod memory;
mod objective;
mod restart;
mod rng;
mod search;

pub use acceptance::*;
pub use benchmark::*;
pub use convergence::*;
pub use driver::*;
pub use improvise::*;
pub use memory::*;
pub use objective::*;
pub use restart::*;
pub use rng::*;
pub use search::*;
