//! Access code representation and BCD conversion.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CODE_LEN, VALUE_SPACE};

/// An ordered sequence of digit slots, each holding a value in 0..=99.
///
/// Digits are stored in binary and converted to BCD only at the wire
/// boundary. The search controller mutates one slot at a time; there is
/// never more than one writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Code {
    digits: [u8; CODE_LEN],
}

impl Code {
    /// Create a code with all slots set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a code from explicit digit values.
    pub fn from_digits(digits: [u8; CODE_LEN]) -> Self {
        for d in digits {
            assert!(d < VALUE_SPACE, "digit value must be in 0..=99");
        }
        Self { digits }
    }

    /// Set the digit at `position` to `value`.
    pub fn set(&mut self, position: usize, value: u8) {
        debug_assert!(value < VALUE_SPACE, "digit value must be in 0..=99");
        self.digits[position] = value;
    }

    /// Get the digit at `position`.
    pub fn get(&self, position: usize) -> u8 {
        self.digits[position]
    }

    /// All digit values in logical order.
    pub fn digits(&self) -> &[u8; CODE_LEN] {
        &self.digits
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.digits.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02}", d)?;
        }
        Ok(())
    }
}

/// Convert a binary value 0..=99 to its BCD wire encoding.
pub fn bin_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Convert a BCD wire byte back to its binary value.
pub fn bcd_to_bin(value: u8) -> u8 {
    ((value >> 4) * 10) + (value & 0x0f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcd_round_trip() {
        for v in 0..100u8 {
            assert_eq!(bcd_to_bin(bin_to_bcd(v)), v);
        }
    }

    #[test]
    fn bcd_encoding() {
        assert_eq!(bin_to_bcd(0), 0x00);
        assert_eq!(bin_to_bcd(34), 0x34);
        assert_eq!(bin_to_bcd(99), 0x99);
    }

    #[test]
    fn code_set_get() {
        let mut code = Code::new();
        code.set(2, 47);
        assert_eq!(code.get(2), 47);
        assert_eq!(code.get(0), 0);
    }

    #[test]
    fn code_display() {
        let code = Code::from_digits([34, 84, 7, 55, 0, 91]);
        assert_eq!(code.to_string(), "34 84 07 55 00 91");
    }

    #[test]
    #[should_panic]
    fn code_rejects_out_of_range_digit() {
        Code::from_digits([100, 0, 0, 0, 0, 0]);
    }
}
