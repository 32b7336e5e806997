//! Board configuration - root configuration structure.

use serde::Deserialize;

use super::units::{ActiveLevel, Microsteps};

/// Fastest ramp speed in full steps per second.
pub const MAX_SPEED: u16 = 400;
/// Slowest ramp speed in full steps per second; the ramp wraps back to it.
pub const MIN_SPEED: u16 = 50;
/// Speed added on every ramp tick.
pub const SPEED_INCREMENT: u16 = 1;
/// Ramp tick period in milliseconds.
pub const RAMP_TICK_MS: u32 = 15;
/// Delay after each full step while measuring during calibration.
pub const CALIBRATION_STEP_MS: u32 = 50;
/// Delay after each full step of the homing move.
pub const HOMING_STEP_MS: u32 = 40;
/// Time the driver is held in reset before homing.
pub const LIMP_MS: u32 = 1000;
/// Step pulse width in microseconds (driver minimum, not configurable).
pub const PULSE_WIDTH_US: u32 = 1;
/// Step timer tick rate in Hz.
pub const TIMER_TICK_HZ: u32 = 1_000_000;

/// Root configuration structure from TOML.
///
/// Every section and field is optional; omitted values take the board
/// defaults above.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Ramp speed range and increment.
    pub speed: SpeedLimits,

    /// Blocking intervals used by the main loop and homing.
    pub timing: Timing,

    /// Driver settings.
    pub driver: DriverSettings,
}

/// Ramp speed range in full steps per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpeedLimits {
    /// Speed the ramp wraps back to.
    pub min: u16,
    /// Highest speed the ramp reaches before wrapping.
    pub max: u16,
    /// Speed added on each ramp tick.
    pub increment: u16,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min: MIN_SPEED,
            max: MAX_SPEED,
            increment: SPEED_INCREMENT,
        }
    }
}

impl SpeedLimits {
    /// Clamp a speed into `[min, max]`.
    #[inline]
    pub fn clamp(&self, speed: u16) -> u16 {
        speed.max(self.min).min(self.max)
    }

    /// Check if a speed is inside the range.
    #[inline]
    pub fn contains(&self, speed: u16) -> bool {
        speed >= self.min && speed <= self.max
    }
}

/// Blocking intervals in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Ramp tick period.
    pub ramp_tick_ms: u32,
    /// Delay after each calibration step.
    pub calibration_step_ms: u32,
    /// Delay after each homing step.
    pub homing_step_ms: u32,
    /// Reset hold time before homing.
    pub limp_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            ramp_tick_ms: RAMP_TICK_MS,
            calibration_step_ms: CALIBRATION_STEP_MS,
            homing_step_ms: HOMING_STEP_MS,
            limp_ms: LIMP_MS,
        }
    }
}

/// Driver and operator input settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Microstep divisor used while oscillating.
    pub microsteps: Microsteps,

    /// Level at which the operator input counts as asserted.
    pub input_active: ActiveLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_board_constants() {
        let config = BoardConfig::default();

        assert_eq!(config.speed.min, 50);
        assert_eq!(config.speed.max, 400);
        assert_eq!(config.speed.increment, 1);
        assert_eq!(config.timing.ramp_tick_ms, 15);
        assert_eq!(config.timing.calibration_step_ms, 50);
        assert_eq!(config.timing.homing_step_ms, 40);
        assert_eq!(config.timing.limp_ms, 1000);
        assert_eq!(config.driver.microsteps, Microsteps::SIXTEENTH);
        assert_eq!(config.driver.input_active, ActiveLevel::Low);
    }

    #[test]
    fn test_speed_clamp() {
        let limits = SpeedLimits::default();

        assert_eq!(limits.clamp(0), 50);
        assert_eq!(limits.clamp(120), 120);
        assert_eq!(limits.clamp(5000), 400);
        assert!(limits.contains(400));
        assert!(!limits.contains(401));
    }
}
