//! Batch partitioning of a digit's value space.
//!
//! A digit can take 100 values; probing each one to statistical
//! significance is too slow. Instead the space is split into 10 contiguous
//! batches of 10 and each batch is scored as a unit. Batches are processed
//! strictly sequentially; the name refers to the partitioning, not to
//! parallel execution.

use crate::calibration::CalibrationBaseline;
use crate::cancel::CancelToken;
use crate::constants::{BATCH_SIZE, MIN_SAMPLES_PER_BATCH, VALUE_SPACE};
use crate::measurement::{ProbeOutcome, UnlockOracle};
use crate::statistics::{CandidateStats, ConfidenceContext};
use crate::types::Code;

use super::policy::{evaluate, Verdict};

/// One contiguous slice of a digit's value space, scored as a unit.
#[derive(Debug, Clone)]
pub struct Batch {
    /// First value in the batch (inclusive).
    pub lo: u8,
    /// Last value in the batch (inclusive).
    pub hi: u8,
    /// Aggregated latency statistics over the batch's values.
    pub stats: CandidateStats,
    /// Final confidence score, recorded when evaluation finishes.
    pub confidence: f64,
    /// Whether the batch has been evaluated.
    pub processed: bool,
}

impl Batch {
    /// The digit value representing this batch: the integer midpoint of
    /// its range.
    pub fn midpoint(&self) -> u8 {
        (self.lo + self.hi) / 2
    }
}

/// Result of evaluating one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// A probe returned explicit success; the position is resolved to this
    /// exact value and no further statistics are needed.
    ExactHit(u8),
    /// No exact success; the batch carries an aggregate confidence score.
    Scored,
    /// Cancellation was observed mid-batch.
    Cancelled,
}

/// Split the full value space into contiguous batches of [`BATCH_SIZE`].
pub fn partition() -> Vec<Batch> {
    (0..VALUE_SPACE)
        .step_by(BATCH_SIZE as usize)
        .map(|lo| Batch {
            lo,
            hi: (lo + BATCH_SIZE - 1).min(VALUE_SPACE - 1),
            stats: CandidateStats::new(),
            confidence: 0.0,
            processed: false,
        })
        .collect()
}

/// Probe budget granted to one batch at the given position.
///
/// The first position gets 1.5x the base budget since every later digit
/// depends on it; later statistical positions get a cheaper sweep, floored
/// at [`MIN_SAMPLES_PER_BATCH`].
pub fn sample_budget(position: usize, base_samples: u32) -> u32 {
    if position == 0 {
        base_samples * 3 / 2
    } else {
        (base_samples / 2).max(MIN_SAMPLES_PER_BATCH)
    }
}

/// Evaluate one batch: sweep its values cyclically until the budget is
/// spent, the policy terminates early, a probe succeeds outright, or
/// cancellation is observed.
///
/// Every oracle call counts against `budget` and increments
/// `total_probes`, including probes that produce no usable latency.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_batch<O: UnlockOracle>(
    oracle: &mut O,
    code: &mut Code,
    position: usize,
    batch: &mut Batch,
    baseline: &CalibrationBaseline,
    ctx: &ConfidenceContext,
    budget: u32,
    cancel: &CancelToken,
    total_probes: &mut u64,
) -> BatchOutcome {
    let mut spent: u32 = 0;

    'sweep: while spent < budget {
        for value in batch.lo..=batch.hi {
            if cancel.is_cancelled() {
                return BatchOutcome::Cancelled;
            }
            if spent >= budget {
                break 'sweep;
            }

            code.set(position, value);
            let outcome = oracle.probe(code, position);
            spent += 1;
            *total_probes += 1;

            match outcome {
                ProbeOutcome::Unlocked { .. } => {
                    batch.confidence = 1.0;
                    batch.processed = true;
                    tracing::info!(position, value, "exact hit during batch sweep");
                    return BatchOutcome::ExactHit(value);
                }
                ProbeOutcome::Rejected { latency } => {
                    batch.stats.record(latency, baseline);
                }
                ProbeOutcome::NoSignal => {}
            }

            let confidence = batch.stats.confidence(ctx);
            match evaluate(batch.stats.valid_samples, confidence) {
                Verdict::Continue => {}
                Verdict::Reject | Verdict::Accept => {
                    batch.confidence = confidence;
                    batch.processed = true;
                    return BatchOutcome::Scored;
                }
            }
        }
    }

    batch.confidence = batch.stats.confidence(ctx);
    batch.processed = true;
    BatchOutcome::Scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ModuleProfile;

    fn setup() -> (CalibrationBaseline, ConfidenceContext) {
        let profile = ModuleProfile::cem_h_p2();
        let baseline = CalibrationBaseline::from_average(10_000, &profile).unwrap();
        let ctx = ConfidenceContext::new(&baseline, &profile, 300);
        (baseline, ctx)
    }

    #[test]
    fn partition_covers_the_value_space() {
        let batches = partition();
        assert_eq!(batches.len(), 10);
        assert_eq!(batches[0].lo, 0);
        assert_eq!(batches[0].hi, 9);
        assert_eq!(batches[9].lo, 90);
        assert_eq!(batches[9].hi, 99);
    }

    #[test]
    fn midpoint_uses_integer_rule() {
        let batches = partition();
        assert_eq!(batches[3].midpoint(), (30 + 39) / 2);
        assert_eq!(batches[3].midpoint(), 34);
    }

    #[test]
    fn first_position_gets_larger_budget() {
        assert_eq!(sample_budget(0, 50), 75);
        assert_eq!(sample_budget(1, 50), 50);
        // The floor keeps cheap sweeps meaningful even for small bases.
        assert_eq!(sample_budget(1, 20), 50);
    }

    /// Oracle with a fixed latency that never unlocks.
    struct FlatOracle {
        latency: u64,
        calls: u64,
    }

    impl UnlockOracle for FlatOracle {
        fn probe(&mut self, _code: &Code, _position: usize) -> ProbeOutcome {
            self.calls += 1;
            ProbeOutcome::Rejected {
                latency: self.latency,
            }
        }
    }

    /// Oracle that unlocks on one specific value.
    struct HitOracle {
        target: u8,
        position: usize,
    }

    impl UnlockOracle for HitOracle {
        fn probe(&mut self, code: &Code, position: usize) -> ProbeOutcome {
            if position == self.position && code.get(position) == self.target {
                ProbeOutcome::Unlocked { latency: 10_000 }
            } else {
                ProbeOutcome::Rejected { latency: 10_000 }
            }
        }
    }

    #[test]
    fn exact_hit_short_circuits() {
        let (baseline, ctx) = setup();
        let mut oracle = HitOracle {
            target: 34,
            position: 0,
        };
        let mut code = Code::new();
        let mut batch = partition().remove(3);
        let cancel = CancelToken::new();
        let mut probes = 0;

        let outcome = evaluate_batch(
            &mut oracle, &mut code, 0, &mut batch, &baseline, &ctx, 75, &cancel, &mut probes,
        );
        assert_eq!(outcome, BatchOutcome::ExactHit(34));
        assert_eq!(batch.confidence, 1.0);
        // Values 30..=33 rejected, then 34 hit.
        assert_eq!(probes, 5);
    }

    #[test]
    fn average_latency_batch_rejects_at_threshold() {
        let (baseline, ctx) = setup();
        // Mean at avg: low confidence, rejected once 10 valid samples exist.
        let mut oracle = FlatOracle {
            latency: 10_000,
            calls: 0,
        };
        let mut code = Code::new();
        let mut batch = partition().remove(0);
        let cancel = CancelToken::new();
        let mut probes = 0;

        let outcome = evaluate_batch(
            &mut oracle, &mut code, 0, &mut batch, &baseline, &ctx, 75, &cancel, &mut probes,
        );
        assert_eq!(outcome, BatchOutcome::Scored);
        assert!(batch.processed);
        assert_eq!(batch.stats.valid_samples, 10);
        assert_eq!(probes, 10);
        assert!(batch.confidence > 0.0);
    }

    #[test]
    fn budget_bounds_the_sweep() {
        let (baseline, ctx) = setup();
        // Out-of-band latency: never a valid sample, never a verdict.
        let mut oracle = FlatOracle {
            latency: 100_000,
            calls: 0,
        };
        let mut code = Code::new();
        let mut batch = partition().remove(0);
        let cancel = CancelToken::new();
        let mut probes = 0;

        let outcome = evaluate_batch(
            &mut oracle, &mut code, 0, &mut batch, &baseline, &ctx, 75, &cancel, &mut probes,
        );
        assert_eq!(outcome, BatchOutcome::Scored);
        assert_eq!(probes, 75);
        assert_eq!(batch.stats.valid_samples, 0);
        assert_eq!(batch.confidence, 0.0);
    }

    #[test]
    fn cancellation_stops_before_the_next_probe() {
        let (baseline, ctx) = setup();
        let mut oracle = FlatOracle {
            latency: 10_000,
            calls: 0,
        };
        let mut code = Code::new();
        let mut batch = partition().remove(0);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut probes = 0;

        let outcome = evaluate_batch(
            &mut oracle, &mut code, 0, &mut batch, &baseline, &ctx, 75, &cancel, &mut probes,
        );
        assert_eq!(outcome, BatchOutcome::Cancelled);
        assert_eq!(oracle.calls, 0);
        assert_eq!(probes, 0);
    }
}
