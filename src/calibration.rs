//! Calibration baseline: the {min, avg, max} reply-latency reference.
//!
//! The baseline is established once, before any digit is attempted, by
//! probing a known-incorrect code and averaging the measured reply
//! latencies. It is immutable afterwards; every other component receives it
//! by value or shared reference and only reads it.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::constants::QUICK_TIMEOUT_FACTOR;
use crate::measurement::{ProbeOutcome, UnlockOracle};
use crate::profile::ModuleProfile;
use crate::types::Code;

/// Error returned when the calibration baseline cannot be established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    /// No probe produced a measurable reply; the target may be absent or
    /// the transport misconfigured.
    NoReply,
    /// Cancellation was requested before calibration finished.
    Cancelled,
    /// The derived band does not satisfy min <= avg <= max.
    InvalidBand,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReply => write!(f, "no reply latency could be measured during calibration"),
            Self::Cancelled => write!(f, "calibration cancelled"),
            Self::InvalidBand => write!(f, "calibration band violates min <= avg <= max"),
        }
    }
}

impl std::error::Error for CalibrationError {}

/// Reply-latency reference established before the search starts.
///
/// All values are in hardware-cycle units. Invariant: `min <= avg <= max`,
/// checked at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    min: u64,
    avg: u64,
    max: u64,
}

impl CalibrationBaseline {
    /// Build a baseline from explicit band values.
    pub fn new(min: u64, avg: u64, max: u64) -> Result<Self, CalibrationError> {
        if min <= avg && avg <= max {
            Ok(Self { min, avg, max })
        } else {
            Err(CalibrationError::InvalidBand)
        }
    }

    /// Derive the band from an observed average using the profile's
    /// reply factor pair.
    pub fn from_average(avg: u64, profile: &ModuleProfile) -> Result<Self, CalibrationError> {
        let min = (avg as f64 * profile.reply_min_factor) as u64;
        let max = (avg as f64 * profile.reply_max_factor) as u64;
        Self::new(min, avg, max)
    }

    /// Lower bound of the valid reply band, in cycles.
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Average reply latency, in cycles.
    pub fn avg(&self) -> u64 {
        self.avg
    }

    /// Upper bound of the valid reply band, in cycles.
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Deadline for cheaply rejecting obviously-wrong candidates, in cycles.
    pub fn quick_timeout(&self) -> u64 {
        (self.avg as f64 * QUICK_TIMEOUT_FACTOR) as u64
    }

    /// Whether a measured latency falls inside the valid reply band.
    pub fn in_band(&self, latency: u64) -> bool {
        latency >= self.min && latency <= self.max
    }
}

/// Establish the baseline by probing a known-incorrect code.
///
/// Issues `rounds` probes of the all-zero code at position 0 (undetermined
/// digits are randomized by the oracle) and averages the latencies of the
/// probes that produced a measurable reply. Probes with no signal are
/// skipped; at least one measurement is required.
pub fn calibrate<O: UnlockOracle>(
    oracle: &mut O,
    profile: &ModuleProfile,
    rounds: u32,
    cancel: &CancelToken,
) -> Result<CalibrationBaseline, CalibrationError> {
    let code = Code::new();
    let mut total: u64 = 0;
    let mut measured: u64 = 0;

    for _ in 0..rounds {
        if cancel.is_cancelled() {
            return Err(CalibrationError::Cancelled);
        }
        match oracle.probe(&code, 0) {
            ProbeOutcome::NoSignal => {}
            ProbeOutcome::Rejected { latency } | ProbeOutcome::Unlocked { latency } => {
                total += latency;
                measured += 1;
            }
        }
    }

    if measured == 0 {
        return Err(CalibrationError::NoReply);
    }

    let avg = total / measured;
    let baseline = CalibrationBaseline::from_average(avg, profile)?;
    tracing::info!(
        min = baseline.min(),
        avg = baseline.avg(),
        max = baseline.max(),
        rounds = measured,
        "calibration baseline established"
    );
    Ok(baseline)
}
