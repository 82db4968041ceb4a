//! Probe measurement: hardware seams and the unlock oracle.
//!
//! Everything that touches real hardware lives behind the traits in
//! [`hardware`]; everything above that boundary is pure logic and testable
//! with fake clocks and transports.

mod hardware;
mod probe;

pub use hardware::{capture_edges, CycleCounter, EdgeCapture, SignalLine, Transport};
pub use probe::{weighted_latency, BusProbe, ProbeOutcome, UnlockOracle};
