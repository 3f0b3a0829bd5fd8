//! Schema module - Configuration, domain and result types for harmony search.

mod config;
mod domain;
mod outcome;

pub use config::*;
pub use domain::*;
pub use outcome::*;
