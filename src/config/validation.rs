//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::board::TIMER_TICK_HZ;
use super::BoardConfig;

/// Validate a board configuration.
///
/// Checks:
/// - Speed range is non-empty and starts above zero
/// - The slowest speed still has a per-step delay that fits in 16 bits
/// - Speed increment is positive
/// - The fastest speed still leaves at least one timer tick per microstep
/// - Ramp tick is positive
pub fn validate_config(config: &BoardConfig) -> Result<()> {
    let speed = &config.speed;

    if speed.min == 0 || speed.min > speed.max {
        return Err(Error::Config(ConfigError::InvalidSpeedRange {
            min: speed.min,
            max: speed.max,
        }));
    }

    if TIMER_TICK_HZ / speed.min as u32 > u16::MAX as u32 {
        return Err(Error::Config(ConfigError::SpeedTooLow { min: speed.min }));
    }

    if speed.increment == 0 {
        return Err(Error::Config(ConfigError::InvalidSpeedIncrement(
            speed.increment,
        )));
    }

    let microsteps = config.driver.microsteps.value() as u32;
    if TIMER_TICK_HZ / speed.max as u32 / microsteps == 0 {
        return Err(Error::Config(ConfigError::SpeedTooHigh {
            max: speed.max,
            microsteps: microsteps as u16,
        }));
    }

    if config.timing.ramp_tick_ms == 0 {
        return Err(Error::Config(ConfigError::InvalidRampTick));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Microsteps;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BoardConfig::default()).is_ok());
    }

    #[test]
    fn test_inverted_speed_range() {
        let mut config = BoardConfig::default();
        config.speed.min = 500;

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidSpeedRange { min: 500, max: 400 }))
        ));
    }

    #[test]
    fn test_zero_min_speed() {
        let mut config = BoardConfig::default();
        config.speed.min = 0;

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_min_speed_below_delay_range() {
        let mut config = BoardConfig::default();
        config.speed.min = 10;
        config.speed.max = 20;

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::SpeedTooLow { min: 10 }))
        ));

        // 1_000_000 / 16 = 62_500 still fits.
        config.speed.min = 16;
        assert!(validate_config(&config).is_ok());
        assert_eq!(
            crate::motion::calculate_delay(16) as u32,
            TIMER_TICK_HZ / 16
        );
    }

    #[test]
    fn test_speed_too_high_for_divisor() {
        let mut config = BoardConfig::default();
        config.driver.microsteps = Microsteps::SIXTEENTH;
        config.speed.max = 62_501;

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::SpeedTooHigh { .. }))
        ));

        config.speed.max = 62_500;
        assert!(validate_config(&config).is_ok());
    }
}
