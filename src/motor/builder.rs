//! Builder pattern for the A4988 driver.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{ConfigError, Error, Result};

use super::driver::{MicrostepSelect, A4988};

/// Builder for creating [`A4988`] instances.
pub struct A4988Builder<STEP, DIR, RST, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    RST: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    reset_pin: Option<RST>,
    microstep_pins: Option<MS>,
    delay: Option<DELAY>,
}

impl<STEP, DIR, RST, MS, DELAY> Default for A4988Builder<STEP, DIR, RST, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    RST: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<STEP, DIR, RST, MS, DELAY> A4988Builder<STEP, DIR, RST, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    RST: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            reset_pin: None,
            microstep_pins: None,
            delay: None,
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the active-low RESET pin.
    pub fn reset_pin(mut self, pin: RST) -> Self {
        self.reset_pin = Some(pin);
        self
    }

    /// Set the microstep select lines.
    pub fn microstep_pins(mut self, pins: MS) -> Self {
        self.microstep_pins = Some(pins);
        self
    }

    /// Set the delay provider used for the step pulse width.
    pub fn delay(mut self, delay: DELAY) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the driver and apply its power-on levels.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin is missing or a pin write fails.
    pub fn build(self) -> Result<A4988<STEP, DIR, RST, MS, DELAY>> {
        let step_pin = self
            .step_pin
            .ok_or(Error::Config(ConfigError::MissingPin("step_pin")))?;
        let dir_pin = self
            .dir_pin
            .ok_or(Error::Config(ConfigError::MissingPin("dir_pin")))?;
        let reset_pin = self
            .reset_pin
            .ok_or(Error::Config(ConfigError::MissingPin("reset_pin")))?;
        let microstep_pins = self
            .microstep_pins
            .ok_or(Error::Config(ConfigError::MissingPin("microstep_pins")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingPin("delay")))?;

        A4988::new(step_pin, dir_pin, reset_pin, microstep_pins, delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::MicrostepPins;
    use crate::sim::{SimDelay, SimPin};

    type SimBuilder =
        A4988Builder<SimPin, SimPin, SimPin, MicrostepPins<SimPin, SimPin, SimPin>, SimDelay>;

    #[test]
    fn test_missing_pin_is_reported() {
        let result = SimBuilder::new()
            .step_pin(SimPin::new())
            .dir_pin(SimPin::new())
            .delay(SimDelay::new())
            .build();

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingPin("reset_pin")))
        ));
    }

    #[test]
    fn test_build_applies_power_on_levels() {
        let driver = SimBuilder::new()
            .step_pin(SimPin::new())
            .dir_pin(SimPin::new())
            .reset_pin(SimPin::new())
            .microstep_pins(MicrostepPins::new(SimPin::new(), SimPin::new(), SimPin::new()))
            .delay(SimDelay::new())
            .build()
            .unwrap();

        let (step, dir, reset, ms, _) = driver.release();
        let (ms1, ms2, ms3) = ms.release();
        assert!(!step.is_high());
        assert!(dir.is_high());
        assert!(reset.is_high());
        assert!(!ms1.is_high() && !ms2.is_high() && !ms3.is_high());
    }
}
