//! Protocol and statistics constants used throughout the crate.

// =============================================================================
// Code and wire format
// =============================================================================

/// Number of digit slots in an access code.
pub const CODE_LEN: usize = 6;

/// Size of a probe/reply frame on the bus, in bytes.
pub const FRAME_LEN: usize = 8;

/// Number of values a single digit slot can take (BCD-encoded 0-99).
pub const VALUE_SPACE: u8 = 100;

/// Module address placed in byte 0 of every unlock frame.
pub const MODULE_ECU_ID: u8 = 0x50;

/// Unlock opcode placed in byte 1 of every unlock frame.
pub const UNLOCK_OPCODE: u8 = 0xBE;

/// Offset of the first digit byte within the frame.
pub const DIGIT_BASE_OFFSET: usize = 2;

/// Index of the status byte within a reply frame.
pub const REPLY_STATUS_INDEX: usize = 2;

/// Status byte value indicating a successful unlock.
pub const STATUS_OK: u8 = 0x00;

// =============================================================================
// Measurement
// =============================================================================

/// Maximum number of falling-edge timestamps captured per probe.
pub const MAX_EDGE_SAMPLES: usize = 3;

/// Fraction of the average reply latency used as the quick-reject deadline.
pub const QUICK_TIMEOUT_FACTOR: f64 = 0.4;

/// Default bounded wait for a full reply frame, in ~1ms poll ticks.
pub const REPLY_WAIT_TICKS: u32 = 500;

/// Edge-capture window used before a calibration baseline exists, in cycles.
///
/// Calibration must see real replies from a cold start; the window shrinks
/// to `avg * QUICK_TIMEOUT_FACTOR` as soon as a baseline is applied.
pub const CALIBRATION_WINDOW_CYCLES: u64 = 2_000_000;

/// Default number of known-incorrect probes used to establish the baseline.
pub const CALIBRATION_ROUNDS: u32 = 25;

// =============================================================================
// Batch search and early termination
// =============================================================================

/// Number of contiguous values evaluated together as one batch.
pub const BATCH_SIZE: u8 = 10;

/// Minimum probe budget granted to a batch at later positions.
pub const MIN_SAMPLES_PER_BATCH: u32 = 50;

/// Sample-count ceiling used to normalize confidence scores.
pub const MAX_SAMPLES_FIRST_POSITION: u32 = 300;

/// Confidence above which a batch is accepted early.
pub const CONFIDENCE_THRESHOLD: f64 = 0.85;

/// Confidence below which a batch is rejected early.
pub const QUICK_REJECT_CONFIDENCE: f64 = 0.2;

/// Minimum valid samples before a confidence score is meaningful.
pub const MIN_VALID_SAMPLES: u32 = 5;

/// Minimum valid samples before a low-confidence batch may be rejected.
pub const QUICK_REJECT_THRESHOLD: u32 = 10;

/// Number of digit positions resolved statistically before brute force.
pub const STATISTICAL_POSITIONS: usize = 2;
