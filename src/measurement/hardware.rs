//! Hardware seams: bus transport, signal line, cycle counter.
//!
//! These traits are the only boundary a real implementation crosses to
//! touch hardware. The edge-capture loop below is the single place the
//! crate busy-polls against a cycle counter; both measurement paths of the
//! protocol go through it, parameterized by the counter source.

use crate::constants::{FRAME_LEN, MAX_EDGE_SAMPLES};

/// Bus transport carrying 8-byte frames to and from the target module.
///
/// Addressing and bus selection are transport-internal. `receive` waits a
/// bounded number of poll ticks (~1ms each) and returns `None` when no
/// frame arrives in time; the caller treats that as an ordinary negative
/// result, never an error.
pub trait Transport {
    /// Send one frame to the target.
    fn send(&mut self, frame: &[u8; FRAME_LEN]);

    /// Receive one frame, waiting at most `wait_ticks` poll ticks.
    fn receive(&mut self, wait_ticks: u32) -> Option<[u8; FRAME_LEN]>;
}

/// Dedicated signal line watched for falling-edge transitions.
pub trait SignalLine {
    /// Whether the line currently reads low (falling edge asserted).
    fn is_low(&self) -> bool;
}

/// Free-running monotonic cycle counter.
///
/// Reads must be cheap enough for a tight polling loop. Wraparound is not
/// handled; the counter must not wrap within one probe's timeout window.
pub trait CycleCounter {
    /// Current counter value.
    fn now(&self) -> u64;
}

/// Up to three falling-edge timestamps, as cycle offsets from probe send.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeCapture {
    offsets: [u64; MAX_EDGE_SAMPLES],
    count: usize,
}

impl EdgeCapture {
    /// The captured edge offsets, oldest first.
    pub fn as_slice(&self) -> &[u64] {
        &self.offsets[..self.count]
    }

    /// Whether no edge was captured before the deadline.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn push(&mut self, offset: u64) {
        self.offsets[self.count] = offset;
        self.count += 1;
    }
}

/// Busy-poll the signal line until `deadline` cycles have elapsed since
/// `start`, recording up to [`MAX_EDGE_SAMPLES`] low readings.
///
/// The loop is bounded: it degrades to an empty capture instead of
/// blocking when the line never drops.
pub fn capture_edges<C: CycleCounter, L: SignalLine>(
    counter: &C,
    line: &L,
    start: u64,
    deadline: u64,
) -> EdgeCapture {
    let mut capture = EdgeCapture::default();
    while counter.now().wrapping_sub(start) < deadline {
        if line.is_low() {
            capture.push(counter.now().wrapping_sub(start));
            if capture.as_slice().len() >= MAX_EDGE_SAMPLES {
                break;
            }
        }
    }
    capture
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counter advancing by a fixed step on every read.
    struct SteppingCounter {
        value: Cell<u64>,
        step: u64,
    }

    impl SteppingCounter {
        fn new(step: u64) -> Self {
            Self {
                value: Cell::new(0),
                step,
            }
        }
    }

    impl CycleCounter for SteppingCounter {
        fn now(&self) -> u64 {
            let v = self.value.get();
            self.value.set(v + self.step);
            v
        }
    }

    /// Line that drops low after a given number of reads.
    struct DelayedLine {
        reads: Cell<u32>,
        low_after: u32,
    }

    impl SignalLine for DelayedLine {
        fn is_low(&self) -> bool {
            let r = self.reads.get() + 1;
            self.reads.set(r);
            r > self.low_after
        }
    }

    #[test]
    fn capture_stops_at_deadline_without_edges() {
        let counter = SteppingCounter::new(100);
        let line = DelayedLine {
            reads: Cell::new(0),
            low_after: u32::MAX,
        };
        let capture = capture_edges(&counter, &line, 0, 1_000);
        assert!(capture.is_empty());
    }

    #[test]
    fn capture_records_at_most_three_edges() {
        let counter = SteppingCounter::new(10);
        let line = DelayedLine {
            reads: Cell::new(0),
            low_after: 0,
        };
        let capture = capture_edges(&counter, &line, 0, 1_000_000);
        assert_eq!(capture.as_slice().len(), 3);
    }

    #[test]
    fn captured_offsets_are_monotonic() {
        let counter = SteppingCounter::new(7);
        let line = DelayedLine {
            reads: Cell::new(0),
            low_after: 2,
        };
        let capture = capture_edges(&counter, &line, 0, 1_000_000);
        let offsets = capture.as_slice();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }
}
