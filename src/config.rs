//! Search configuration.

use core::fmt;

use crate::constants::{
    CALIBRATION_ROUNDS, CODE_LEN, MAX_SAMPLES_FIRST_POSITION, MIN_SAMPLES_PER_BATCH,
    REPLY_WAIT_TICKS, STATISTICAL_POSITIONS,
};

/// Error returned when a configuration fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `base_samples` is zero.
    ZeroBaseSamples,
    /// `sample_ceiling` is zero.
    ZeroSampleCeiling,
    /// `statistical_positions` exceeds the code length.
    TooManyStatisticalPositions,
    /// `calibration_rounds` is zero.
    ZeroCalibrationRounds,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBaseSamples => write!(f, "base_samples must be positive"),
            Self::ZeroSampleCeiling => write!(f, "sample_ceiling must be positive"),
            Self::TooManyStatisticalPositions => {
                write!(f, "statistical_positions must be <= {}", CODE_LEN)
            }
            Self::ZeroCalibrationRounds => write!(f, "calibration_rounds must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunables for the search engine.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base probe budget per batch; scaled per position by the adaptive
    /// budget rule.
    pub base_samples: u32,

    /// Sample-count ceiling used to normalize confidence scores.
    pub sample_ceiling: u32,

    /// How many leading positions are resolved statistically before the
    /// search falls back to linear brute force.
    pub statistical_positions: usize,

    /// Known-incorrect probes issued to establish the baseline.
    pub calibration_rounds: u32,

    /// Bounded reply-frame wait, in ~1ms poll ticks.
    pub reply_wait_ticks: u32,

    /// Optional deterministic seed for filler randomness.
    ///
    /// When set, hosts should construct the probe with a seeded RNG so a
    /// run can be replayed while debugging.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_samples: MIN_SAMPLES_PER_BATCH,
            sample_ceiling: MAX_SAMPLES_FIRST_POSITION,
            statistical_positions: STATISTICAL_POSITIONS,
            calibration_rounds: CALIBRATION_ROUNDS,
            reply_wait_ticks: REPLY_WAIT_TICKS,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheaper sweeps for bench rigs where the target is close and quiet.
    pub fn quick() -> Self {
        Self {
            base_samples: 30,
            calibration_rounds: 10,
            ..Default::default()
        }
    }

    /// More probes per batch for noisy vehicle-side measurements.
    pub fn thorough() -> Self {
        Self {
            base_samples: 100,
            calibration_rounds: 50,
            ..Default::default()
        }
    }

    /// Set the base probe budget per batch.
    pub fn base_samples(mut self, samples: u32) -> Self {
        assert!(samples > 0, "base_samples must be positive");
        self.base_samples = samples;
        self
    }

    /// Set the confidence normalization ceiling.
    pub fn sample_ceiling(mut self, ceiling: u32) -> Self {
        assert!(ceiling > 0, "sample_ceiling must be positive");
        self.sample_ceiling = ceiling;
        self
    }

    /// Set how many leading positions use statistical search.
    pub fn statistical_positions(mut self, positions: usize) -> Self {
        assert!(
            positions <= CODE_LEN,
            "statistical_positions must be <= {}",
            CODE_LEN
        );
        self.statistical_positions = positions;
        self
    }

    /// Set the number of calibration probes.
    pub fn calibration_rounds(mut self, rounds: u32) -> Self {
        assert!(rounds > 0, "calibration_rounds must be positive");
        self.calibration_rounds = rounds;
        self
    }

    /// Set the bounded reply-frame wait in poll ticks.
    pub fn reply_wait_ticks(mut self, ticks: u32) -> Self {
        assert!(ticks > 0, "reply_wait_ticks must be positive");
        self.reply_wait_ticks = ticks;
        self
    }

    /// Set a deterministic seed for filler randomness.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the configuration is coherent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_samples == 0 {
            return Err(ConfigError::ZeroBaseSamples);
        }
        if self.sample_ceiling == 0 {
            return Err(ConfigError::ZeroSampleCeiling);
        }
        if self.statistical_positions > CODE_LEN {
            return Err(ConfigError::TooManyStatisticalPositions);
        }
        if self.calibration_rounds == 0 {
            return Err(ConfigError::ZeroCalibrationRounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_samples, 50);
        assert_eq!(config.sample_ceiling, 300);
        assert_eq!(config.statistical_positions, 2);
    }

    #[test]
    fn presets_are_valid() {
        assert!(SearchConfig::quick().validate().is_ok());
        assert!(SearchConfig::thorough().validate().is_ok());
    }

    #[test]
    fn builder_methods_apply() {
        let config = SearchConfig::new()
            .base_samples(80)
            .statistical_positions(3)
            .seed(42);
        assert_eq!(config.base_samples, 80);
        assert_eq!(config.statistical_positions, 3);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = SearchConfig::default();
        config.base_samples = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroBaseSamples));

        let mut config = SearchConfig::default();
        config.statistical_positions = CODE_LEN + 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyStatisticalPositions)
        );
    }

    #[test]
    #[should_panic]
    fn builder_rejects_zero_samples() {
        SearchConfig::new().base_samples(0);
    }
}
