//! Position-by-position code search: statistical batches, early
//! termination, and the brute-force tail.

mod batch;
mod controller;
mod policy;

pub use batch::{evaluate_batch, partition, sample_budget, Batch, BatchOutcome};
pub use controller::{SearchController, SearchOutcome, SearchState};
pub use policy::{evaluate, Verdict};
