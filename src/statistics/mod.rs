//! Online statistics over noisy latency samples.
//!
//! One [`CandidateStats`] instance tracks the latency distribution of a
//! candidate group (a batch of digit values) while it is under evaluation.
//! Samples outside the calibration band are discarded from the running
//! estimates; the caller tracks its probe budget separately.

use crate::calibration::CalibrationBaseline;
use crate::constants::MIN_VALID_SAMPLES;
use crate::profile::ModuleProfile;

/// Normalization inputs for confidence scoring.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceContext {
    /// Average reply latency from calibration, in cycles.
    pub reply_avg: f64,
    /// Lower reply-band factor from the profile.
    pub min_factor: f64,
    /// Upper reply-band factor from the profile.
    pub max_factor: f64,
    /// Sample-count ceiling used to scale confidence by evidence volume.
    pub sample_ceiling: u32,
}

impl ConfidenceContext {
    /// Build a context from the calibration baseline and profile.
    pub fn new(
        baseline: &CalibrationBaseline,
        profile: &ModuleProfile,
        sample_ceiling: u32,
    ) -> Self {
        Self {
            reply_avg: baseline.avg() as f64,
            min_factor: profile.reply_min_factor,
            max_factor: profile.reply_max_factor,
            sample_ceiling,
        }
    }
}

/// Running latency statistics for one candidate group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateStats {
    /// Sum of all in-band latencies, in cycles.
    pub total_latency: u64,
    /// Number of in-band samples ingested.
    pub valid_samples: u32,
    /// Running mean of in-band latencies. Defined only when
    /// `valid_samples > 0`.
    pub mean_latency: f64,
    /// Approximate rolling deviation (see [`CandidateStats::record`]).
    pub std_deviation: f64,
}

impl CandidateStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one measured latency.
    ///
    /// Returns `true` if the sample fell inside the calibration band and
    /// was counted; out-of-band samples (abnormally fast or slow replies)
    /// are discarded from the running estimates.
    ///
    /// The deviation update is the protocol tooling's cheap incremental
    /// rule, not Welford's formula:
    /// `std' = (std * (n-1) + |x - mean_before|) / n`. It underestimates a
    /// textbook rolling variance; downstream code treats it strictly as a
    /// consistency signal and the same rule must be kept for
    /// result-compatible confidence scores.
    pub fn record(&mut self, latency: u64, baseline: &CalibrationBaseline) -> bool {
        if !baseline.in_band(latency) {
            return false;
        }

        self.total_latency += latency;
        self.valid_samples += 1;

        let old_mean = self.mean_latency;
        self.mean_latency = self.total_latency as f64 / self.valid_samples as f64;

        if self.valid_samples > 1 {
            let n = self.valid_samples as f64;
            self.std_deviation =
                (self.std_deviation * (n - 1.0) + (latency as f64 - old_mean).abs()) / n;
        }

        true
    }

    /// Confidence that this candidate group contains the correct digit.
    ///
    /// A ranking heuristic, not a calibrated probability: the product of a
    /// normalized latency score, a consistency term, and an evidence-volume
    /// term. Not clamped; pathological inputs can push it below 0 or above
    /// 1. Returns 0 until [`MIN_VALID_SAMPLES`] in-band samples exist.
    pub fn confidence(&self, ctx: &ConfidenceContext) -> f64 {
        if self.valid_samples < MIN_VALID_SAMPLES {
            return 0.0;
        }

        let normalized = self.mean_latency / ctx.reply_avg;
        let latency_score =
            1.0 - (normalized - ctx.min_factor) / (ctx.max_factor - ctx.min_factor);
        let consistency = 1.0 - self.std_deviation / self.mean_latency;

        latency_score * consistency * (self.valid_samples as f64 / ctx.sample_ceiling as f64)
    }
}
