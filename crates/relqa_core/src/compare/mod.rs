//! Comparison of reviewed match groups.

mod executor;
mod types;

pub use executor::{artifact_name, Executor};
pub use types::{Category, CategoryReport, CompareError, CompareResult, GroupReport, Outcome};
