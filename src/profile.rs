//! Protocol profiles for target module variants.
//!
//! A profile bundles everything that varies between module hardware
//! revisions: the shuffle order mapping logical digit index to wire byte
//! offset, the reply-latency factor pair used to derive the valid latency
//! band, and the part-number database used to recognize the variant.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::CODE_LEN;

/// Part numbers known to carry the CEM-H P2 protocol variant.
const CEM_H_P2_PARTS: &[u32] = &[
    30_786_476, 30_728_539, 30_682_982, 30_728_357, 30_765_148, 30_765_643,
    30_786_890, 30_795_115, 31_282_455, 31_394_157, 30_786_579,
];

/// Error returned when a profile fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The shuffle order is not a permutation of 0..CODE_LEN.
    InvalidShuffle,
    /// The reply factor pair is not ordered 0 < min < max.
    InvalidFactors,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShuffle => {
                write!(f, "shuffle order must be a permutation of 0..{}", CODE_LEN)
            }
            Self::InvalidFactors => {
                write!(f, "reply factors must satisfy 0 < min < max")
            }
        }
    }
}

impl std::error::Error for ProfileError {}

/// Protocol parameters for one target module variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProfile {
    /// Human-readable variant name.
    pub name: String,
    /// Logical digit index -> wire byte offset (relative to the digit base).
    pub shuffle_order: [usize; CODE_LEN],
    /// Lower bound of the valid reply band, as a fraction of the average.
    pub reply_min_factor: f64,
    /// Upper bound of the valid reply band, as a fraction of the average.
    pub reply_max_factor: f64,
    /// Part numbers carrying this variant.
    part_numbers: Vec<u32>,
}

impl ModuleProfile {
    /// Profile for the CEM-H P2 module variant.
    pub fn cem_h_p2() -> Self {
        Self {
            name: "CEM-H P2".to_string(),
            shuffle_order: [3, 1, 5, 0, 2, 4],
            reply_min_factor: 0.4,
            reply_max_factor: 1.3,
            part_numbers: CEM_H_P2_PARTS.to_vec(),
        }
    }

    /// Look up the profile for a target identified by part number.
    pub fn for_part_number(part_number: u32) -> Option<Self> {
        let profile = Self::cem_h_p2();
        if profile.matches_part(part_number) {
            Some(profile)
        } else {
            None
        }
    }

    /// Whether this profile covers the given part number.
    pub fn matches_part(&self, part_number: u32) -> bool {
        self.part_numbers.contains(&part_number)
    }

    /// Validate the profile.
    ///
    /// A missing or malformed profile is the one condition that must be
    /// fatal before calibration; nothing downstream re-checks it.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen = [false; CODE_LEN];
        for &offset in &self.shuffle_order {
            if offset >= CODE_LEN || seen[offset] {
                return Err(ProfileError::InvalidShuffle);
            }
            seen[offset] = true;
        }
        if !(self.reply_min_factor > 0.0 && self.reply_min_factor < self.reply_max_factor) {
            return Err(ProfileError::InvalidFactors);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cem_h_p2_is_valid() {
        assert!(ModuleProfile::cem_h_p2().validate().is_ok());
    }

    #[test]
    fn part_number_lookup() {
        assert!(ModuleProfile::for_part_number(30_786_476).is_some());
        assert!(ModuleProfile::for_part_number(12_345_678).is_none());
    }

    #[test]
    fn duplicate_shuffle_offset_rejected() {
        let mut profile = ModuleProfile::cem_h_p2();
        profile.shuffle_order = [3, 3, 5, 0, 2, 4];
        assert_eq!(profile.validate(), Err(ProfileError::InvalidShuffle));
    }

    #[test]
    fn inverted_factors_rejected() {
        let mut profile = ModuleProfile::cem_h_p2();
        profile.reply_min_factor = 1.3;
        profile.reply_max_factor = 0.4;
        assert_eq!(profile.validate(), Err(ProfileError::InvalidFactors));
    }
}
