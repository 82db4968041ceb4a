//! The digit search controller: orchestrates the whole code recovery.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationBaseline;
use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::constants::{CODE_LEN, VALUE_SPACE};
use crate::measurement::UnlockOracle;
use crate::profile::ModuleProfile;
use crate::progress::ProgressSink;
use crate::statistics::ConfidenceContext;
use crate::types::Code;

use super::batch::{evaluate_batch, partition, sample_budget, BatchOutcome};

/// Phase of the search state machine, exposed for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    /// Constructed, not yet running.
    Idle,
    /// Establishing the calibration baseline (performed by
    /// [`crate::calibration::calibrate`] before the controller runs; the
    /// state exists for hosts that drive both phases).
    CalibratingBaseline,
    /// Statistical batch search at the given position.
    SearchingStatistical(usize),
    /// Linear brute force at the given position.
    SearchingBruteForce(usize),
    /// The final digit was confirmed.
    Resolved,
    /// Cancellation was observed.
    Aborted,
    /// Brute force swept a position without confirmation.
    Exhausted,
}

/// Terminal result of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Every digit was recovered and the final one confirmed by the
    /// target.
    Resolved {
        /// The recovered code.
        code: Code,
        /// Total probes issued.
        probes: u64,
    },
    /// Cancellation was observed; already-chosen digits are preserved.
    Aborted {
        /// The code as far as it got.
        partial: Code,
        /// Number of leading positions that were finalized.
        confirmed_positions: usize,
        /// Total probes issued.
        probes: u64,
    },
    /// A brute-force position found no confirming value, which means an
    /// earlier statistically-inferred digit is likely wrong. The operator
    /// restarts the statistical phase; the engine does not retry on its
    /// own.
    Exhausted {
        /// The code as far as it got.
        partial: Code,
        /// The position that exhausted its value space.
        position: usize,
        /// Total probes issued.
        probes: u64,
    },
}

enum PositionResult {
    Chosen(u8),
    Cancelled,
    Exhausted,
}

/// Drives the position-by-position recovery: statistical batch search for
/// the leading positions, linear brute force with explicit confirmation
/// for the rest.
///
/// Holds the oracle exclusively for the duration of the run; probes are
/// strictly sequential.
pub struct SearchController<'a, O: UnlockOracle, P: ProgressSink> {
    oracle: &'a mut O,
    progress: &'a mut P,
    cancel: &'a CancelToken,
    baseline: CalibrationBaseline,
    ctx: ConfidenceContext,
    config: SearchConfig,
    state: SearchState,
    probes: u64,
}

impl<'a, O: UnlockOracle, P: ProgressSink> SearchController<'a, O, P> {
    /// Create a controller over a calibrated oracle.
    ///
    /// The profile must validate and the configuration must be coherent;
    /// both are fatal here, never mid-search.
    pub fn new(
        oracle: &'a mut O,
        profile: &ModuleProfile,
        baseline: CalibrationBaseline,
        config: SearchConfig,
        cancel: &'a CancelToken,
        progress: &'a mut P,
    ) -> Self {
        if let Err(err) = profile.validate() {
            panic!("invalid module profile: {err}");
        }
        if let Err(err) = config.validate() {
            panic!("invalid search configuration: {err}");
        }
        let ctx = ConfidenceContext::new(&baseline, profile, config.sample_ceiling);
        Self {
            oracle,
            progress,
            cancel,
            baseline,
            ctx,
            config,
            state: SearchState::Idle,
            probes: 0,
        }
    }

    /// Current phase of the state machine.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Run the search to a terminal state.
    pub fn run(&mut self) -> SearchOutcome {
        let mut code = Code::new();
        let mut confirmed = 0usize;

        if self.cancel.is_cancelled() {
            self.state = SearchState::Aborted;
            return SearchOutcome::Aborted {
                partial: code,
                confirmed_positions: 0,
                probes: self.probes,
            };
        }

        for position in 0..self.config.statistical_positions {
            self.state = SearchState::SearchingStatistical(position);
            tracing::info!(position, "statistical search");
            match self.search_statistical(&mut code, position) {
                PositionResult::Chosen(value) => {
                    self.progress.digit_chosen(position, value);
                    confirmed += 1;
                }
                PositionResult::Cancelled => {
                    return self.abort(code, confirmed);
                }
                PositionResult::Exhausted => unreachable!("statistical phase always chooses"),
            }
        }

        for position in self.config.statistical_positions..CODE_LEN {
            self.state = SearchState::SearchingBruteForce(position);
            tracing::info!(position, "brute force");
            match self.brute_force(&mut code, position) {
                PositionResult::Chosen(value) => {
                    self.progress.digit_chosen(position, value);
                    confirmed += 1;
                }
                PositionResult::Cancelled => {
                    return self.abort(code, confirmed);
                }
                PositionResult::Exhausted => {
                    self.state = SearchState::Exhausted;
                    tracing::warn!(position, "value space exhausted without confirmation");
                    return SearchOutcome::Exhausted {
                        partial: code,
                        position,
                        probes: self.probes,
                    };
                }
            }
        }

        self.state = SearchState::Resolved;
        tracing::info!(code = %code, probes = self.probes, "code recovered");
        SearchOutcome::Resolved {
            code,
            probes: self.probes,
        }
    }

    fn abort(&mut self, partial: Code, confirmed: usize) -> SearchOutcome {
        self.state = SearchState::Aborted;
        tracing::info!(confirmed, "search aborted");
        SearchOutcome::Aborted {
            partial,
            confirmed_positions: confirmed,
            probes: self.probes,
        }
    }

    /// Batch search over the full value space at one position.
    ///
    /// An exact hit resolves the position outright. Otherwise the batch
    /// with the highest aggregate confidence wins and the digit is set to
    /// its range midpoint, trading precision for probe count. An all-zero
    /// tie defaults to the first batch.
    fn search_statistical(&mut self, code: &mut Code, position: usize) -> PositionResult {
        let budget = sample_budget(position, self.config.base_samples);
        let mut batches = partition();
        let total = batches.len();

        for (i, batch) in batches.iter_mut().enumerate() {
            if self.cancel.is_cancelled() {
                return PositionResult::Cancelled;
            }
            match evaluate_batch(
                self.oracle,
                code,
                position,
                batch,
                &self.baseline,
                &self.ctx,
                budget,
                self.cancel,
                &mut self.probes,
            ) {
                BatchOutcome::ExactHit(value) => {
                    code.set(position, value);
                    return PositionResult::Chosen(value);
                }
                BatchOutcome::Cancelled => return PositionResult::Cancelled,
                BatchOutcome::Scored => {}
            }
            let percent = (((i + 1) * 100) / total) as u8;
            self.progress.position_progress(position, percent);
            tracing::debug!(
                position,
                lo = batch.lo,
                hi = batch.hi,
                confidence = batch.confidence,
                valid = batch.stats.valid_samples,
                "batch scored"
            );
        }

        let mut best = 0usize;
        let mut max_confidence = 0.0f64;
        for (i, batch) in batches.iter().enumerate() {
            if batch.confidence > max_confidence {
                max_confidence = batch.confidence;
                best = i;
            }
        }

        let value = batches[best].midpoint();
        code.set(position, value);
        PositionResult::Chosen(value)
    }

    /// Linear sweep of every value at one position; only an explicit
    /// success from the target confirms a digit here.
    fn brute_force(&mut self, code: &mut Code, position: usize) -> PositionResult {
        for value in 0..VALUE_SPACE {
            if self.cancel.is_cancelled() {
                return PositionResult::Cancelled;
            }
            code.set(position, value);
            self.probes += 1;
            if self.oracle.probe(code, position).is_unlocked() {
                return PositionResult::Chosen(value);
            }
            if value % 10 == 0 {
                self.progress.position_progress(position, value);
            }
        }
        PositionResult::Exhausted
    }
}
