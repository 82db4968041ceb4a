//! # pindrop
//!
//! Recover a multi-digit access code from an automotive security module by
//! exploiting a timing side channel in its unlock protocol: the module's
//! reply latency correlates with how many leading digits of a submitted
//! code are correct.
//!
//! The engine probes the target over a bus transport, measures reply
//! latency with cycle-level multi-edge capture, and resolves the code
//! position by position: statistical batch search for the leading digits,
//! linear brute force with explicit target confirmation for the rest.
//!
//! ## Hardware boundary
//!
//! Everything hardware-specific sits behind three small traits -
//! [`Transport`], [`SignalLine`], and [`CycleCounter`]. Above that
//! boundary the engine is pure logic, testable against fake clocks and
//! deterministic oracles.
//!
//! ## Quick start
//!
//! ```ignore
//! use pindrop::{
//!     calibrate, BusProbe, CancelToken, ModuleProfile, NullProgress,
//!     SearchConfig, SearchController, SearchOutcome,
//! };
//!
//! let profile = ModuleProfile::for_part_number(part_number)
//!     .expect("unsupported module variant");
//! let config = SearchConfig::default();
//! let cancel = CancelToken::new();
//!
//! let mut probe = BusProbe::new(transport, line, counter, profile.clone());
//! let baseline = calibrate(&mut probe, &profile, config.calibration_rounds, &cancel)?;
//! probe.apply_baseline(&baseline);
//!
//! let mut progress = NullProgress;
//! let mut controller =
//!     SearchController::new(&mut probe, &profile, baseline, config, &cancel, &mut progress);
//! match controller.run() {
//!     SearchOutcome::Resolved { code, probes } => {
//!         println!("code {} in {} probes", code, probes);
//!     }
//!     SearchOutcome::Aborted { .. } => println!("aborted"),
//!     SearchOutcome::Exhausted { position, .. } => {
//!         println!("exhausted at position {}, restart the statistical phase", position);
//!     }
//! }
//! ```
//!
//! ## Scope
//!
//! The crate is the timing-inference search engine only. Bus framing,
//! display hardware, abort-button wiring, and device identification beyond
//! the part-number lookup are host concerns behind the traits above.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod calibration;
mod cancel;
mod config;
mod constants;
mod profile;
mod progress;
mod types;

pub mod measurement;
pub mod search;
pub mod statistics;

pub use calibration::{calibrate, CalibrationBaseline, CalibrationError};
pub use cancel::CancelToken;
pub use config::{ConfigError, SearchConfig};
pub use constants::{CODE_LEN, FRAME_LEN, VALUE_SPACE};
pub use measurement::{
    BusProbe, CycleCounter, ProbeOutcome, SignalLine, Transport, UnlockOracle,
};
pub use profile::{ModuleProfile, ProfileError};
pub use progress::{NullProgress, ProgressSink, TerminalProgress};
pub use search::{SearchController, SearchOutcome, SearchState};
pub use types::{bcd_to_bin, bin_to_bcd, Code};
