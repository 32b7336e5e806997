//! Unit types for driver settings.
//!
//! Provides validated microstep divisors and input polarity.

use serde::Deserialize;

use crate::error::ConfigError;

/// Microstep divisor supported by A4988-class drivers (1, 2, 4, 8, 16).
///
/// Validated at construction to be a power of 2 within the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Microsteps(u8);

impl Microsteps {
    /// Full step (no microstepping).
    pub const FULL: Self = Self(1);
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth step (maximum resolution).
    pub const SIXTEENTH: Self = Self(16);

    /// Valid microstep values.
    const VALID_VALUES: [u16; 5] = [1, 2, 4, 8, 16];

    /// Create a new Microsteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMicrosteps` if the value is not a supported power of 2.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if Self::VALID_VALUES.contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Levels of the MS1, MS2, MS3 select lines for this divisor.
    pub const fn select_levels(self) -> [bool; 3] {
        let v = self.0;
        [
            v == 2 || v == 8 || v == 16,
            v == 4 || v == 8 || v == 16,
            v == 16,
        ]
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self::SIXTEENTH
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// Electrical level at which the operator input counts as asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ActiveLevel {
    /// Asserted when the pin reads low (button to ground with pull-up).
    #[default]
    Low,
    /// Asserted when the pin reads high.
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microsteps_valid_values() {
        for &v in &Microsteps::VALID_VALUES {
            assert!(Microsteps::new(v).is_ok());
        }
    }

    #[test]
    fn test_microsteps_invalid_values() {
        assert!(Microsteps::new(0).is_err());
        assert!(Microsteps::new(3).is_err());
        assert!(Microsteps::new(17).is_err());
        assert!(Microsteps::new(32).is_err());
    }

    #[test]
    fn test_select_levels_truth_table() {
        assert_eq!(Microsteps::FULL.select_levels(), [false, false, false]);
        assert_eq!(Microsteps::HALF.select_levels(), [true, false, false]);
        assert_eq!(Microsteps::QUARTER.select_levels(), [false, true, false]);
        assert_eq!(Microsteps::EIGHTH.select_levels(), [true, true, false]);
        assert_eq!(Microsteps::SIXTEENTH.select_levels(), [true, true, true]);
    }
}
