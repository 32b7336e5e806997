//! Operator input (calibration request and runtime pause).

use embedded_hal::digital::InputPin;

use crate::config::units::ActiveLevel;
use crate::error::{MotorError, Result};

/// Level-sensitive operator input with configurable polarity.
#[derive(Debug)]
pub struct OperatorInput<I: InputPin> {
    pin: I,
    active: ActiveLevel,
}

impl<I: InputPin> OperatorInput<I> {
    /// Wrap an input pin.
    pub fn new(pin: I, active: ActiveLevel) -> Self {
        Self { pin, active }
    }

    /// Sample the input.
    pub fn is_asserted(&mut self) -> Result<bool> {
        let asserted = match self.active {
            ActiveLevel::High => self.pin.is_high(),
            ActiveLevel::Low => self.pin.is_low(),
        };
        Ok(asserted.map_err(|_| MotorError::InputError)?)
    }

    /// Busy-poll until the input reads `asserted`.
    pub fn wait_for(&mut self, asserted: bool) -> Result<()> {
        while self.is_asserted()? != asserted {}
        Ok(())
    }

    /// Give the pin back.
    pub fn release(self) -> I {
        self.pin
    }
}
