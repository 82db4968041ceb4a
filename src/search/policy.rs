//! Early-termination policy for batch evaluation.

use crate::constants::{
    CONFIDENCE_THRESHOLD, MIN_VALID_SAMPLES, QUICK_REJECT_CONFIDENCE, QUICK_REJECT_THRESHOLD,
};

/// Decision about a candidate group under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep sampling; the evidence is inconclusive.
    Continue,
    /// The group is confidently wrong; stop spending probes on it.
    Reject,
    /// The group is confidently right; stop sampling early.
    Accept,
}

/// Decide whether to keep sampling a candidate group.
///
/// Rejection requires more samples than acceptance: a group is only
/// written off once [`QUICK_REJECT_THRESHOLD`] in-band samples agree it
/// scores below [`QUICK_REJECT_CONFIDENCE`]. The outer loop bounds
/// sampling by the per-position budget and the cancellation token.
pub fn evaluate(valid_samples: u32, confidence: f64) -> Verdict {
    if valid_samples >= QUICK_REJECT_THRESHOLD && confidence < QUICK_REJECT_CONFIDENCE {
        return Verdict::Reject;
    }
    if valid_samples >= MIN_VALID_SAMPLES && confidence > CONFIDENCE_THRESHOLD {
        return Verdict::Accept;
    }
    Verdict::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_confidence_below_threshold_continues() {
        // One sample short of the reject threshold.
        assert_eq!(evaluate(9, 0.1), Verdict::Continue);
    }

    #[test]
    fn low_confidence_at_threshold_rejects() {
        assert_eq!(evaluate(10, 0.1), Verdict::Reject);
    }

    #[test]
    fn high_confidence_accepts_at_minimum_samples() {
        assert_eq!(evaluate(5, 0.9), Verdict::Accept);
        assert_eq!(evaluate(4, 0.9), Verdict::Continue);
    }

    #[test]
    fn boundary_confidences_continue() {
        // Thresholds are strict inequalities.
        assert_eq!(evaluate(10, 0.2), Verdict::Continue);
        assert_eq!(evaluate(10, 0.85), Verdict::Continue);
    }
}
