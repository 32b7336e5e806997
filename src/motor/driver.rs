//! A4988-class step/direction driver.
//!
//! Generic over embedded-hal 1.0 pin types. Owns the step, direction, reset,
//! and microstep-select lines during boot; at arming the step and direction
//! lines move into the pulse generator.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::Microsteps;
use crate::config::PULSE_WIDTH_US;
use crate::error::{MotorError, Result};

use super::pulse::PulseGenerator;
use super::state::Direction;

/// Capability to drive the microstep-select lines.
pub trait MicrostepSelect {
    /// Configure the driver for a microstep divisor.
    fn select(&mut self, microsteps: Microsteps) -> Result<()>;
}

/// The three MS select lines of an A4988.
#[derive(Debug)]
pub struct MicrostepPins<MS1, MS2, MS3> {
    ms1: MS1,
    ms2: MS2,
    ms3: MS3,
}

impl<MS1, MS2, MS3> MicrostepPins<MS1, MS2, MS3>
where
    MS1: OutputPin,
    MS2: OutputPin,
    MS3: OutputPin,
{
    /// Bundle the select lines.
    pub fn new(ms1: MS1, ms2: MS2, ms3: MS3) -> Self {
        Self { ms1, ms2, ms3 }
    }

    /// Give the pins back.
    pub fn release(self) -> (MS1, MS2, MS3) {
        (self.ms1, self.ms2, self.ms3)
    }
}

fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<()> {
    if high {
        pin.set_high().map_err(|_| MotorError::PinError)?;
    } else {
        pin.set_low().map_err(|_| MotorError::PinError)?;
    }
    Ok(())
}

impl<MS1, MS2, MS3> MicrostepSelect for MicrostepPins<MS1, MS2, MS3>
where
    MS1: OutputPin,
    MS2: OutputPin,
    MS3: OutputPin,
{
    fn select(&mut self, microsteps: Microsteps) -> Result<()> {
        let [ms1, ms2, ms3] = microsteps.select_levels();
        set_level(&mut self.ms1, ms1)?;
        set_level(&mut self.ms2, ms2)?;
        set_level(&mut self.ms3, ms3)?;
        Ok(())
    }
}

/// Step/direction driver with reset and microstep control.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `RST`: active-low reset pin type (must implement `OutputPin`)
/// - `MS`: microstep select lines (must implement [`MicrostepSelect`])
/// - `DELAY`: Delay provider for the pulse width (must implement `DelayNs`)
pub struct A4988<STEP, DIR, RST, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    RST: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    step_pin: STEP,
    dir_pin: DIR,
    reset_pin: RST,
    microstep_pins: MS,
    delay: DELAY,

    /// Current direction (cached to avoid unnecessary pin writes).
    direction: Direction,

    /// Divisor currently selected on the MS lines.
    microsteps: Microsteps,
}

impl<STEP, DIR, RST, MS, DELAY> A4988<STEP, DIR, RST, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    RST: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    /// Create a driver and apply the power-on levels: step low, direction
    /// Forward, reset released, full steps.
    pub(crate) fn new(
        step_pin: STEP,
        dir_pin: DIR,
        reset_pin: RST,
        microstep_pins: MS,
        delay: DELAY,
    ) -> Result<Self> {
        let mut driver = Self {
            step_pin,
            dir_pin,
            reset_pin,
            microstep_pins,
            delay,
            direction: Direction::Forward,
            microsteps: Microsteps::FULL,
        };

        driver.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        set_level(&mut driver.dir_pin, Direction::Forward.pin_level())?;
        driver.reset_pin.set_high().map_err(|_| MotorError::PinError)?;
        driver.microstep_pins.select(Microsteps::FULL)?;

        Ok(driver)
    }

    /// Emit one step pulse of the minimum width.
    pub fn pulse(&mut self) -> Result<()> {
        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(PULSE_WIDTH_US);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        Ok(())
    }

    /// Emit one step pulse, then block for `wait_ms`.
    pub fn step_and_wait<D: DelayNs>(&mut self, delay: &mut D, wait_ms: u32) -> Result<()> {
        self.pulse()?;
        delay.delay_ms(wait_ms);
        Ok(())
    }

    /// Set the direction of travel.
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.direction == direction {
            return Ok(());
        }
        set_level(&mut self.dir_pin, direction.pin_level())?;
        self.direction = direction;
        Ok(())
    }

    /// Get the current direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Select a microstep divisor.
    pub fn set_microsteps(&mut self, microsteps: Microsteps) -> Result<()> {
        self.microstep_pins.select(microsteps)?;
        self.microsteps = microsteps;
        debug!("microsteps set to 1/{}", microsteps.value());
        Ok(())
    }

    /// Get the selected microstep divisor.
    #[inline]
    pub fn microsteps(&self) -> Microsteps {
        self.microsteps
    }

    /// Hold the reset line low for `hold_ms` so the motor goes limp, then
    /// release it.
    pub fn go_limp<D: DelayNs>(&mut self, delay: &mut D, hold_ms: u32) -> Result<()> {
        self.reset_pin.set_low().map_err(|_| MotorError::PinError)?;
        delay.delay_ms(hold_ms);
        self.reset_pin.set_high().map_err(|_| MotorError::PinError)?;
        Ok(())
    }

    /// Hand the step and direction lines to a pulse generator.
    ///
    /// The reset and microstep lines are returned for the caller to keep.
    pub fn into_pulse_generator(self) -> (PulseGenerator<STEP, DIR, DELAY>, RST, MS) {
        let generator = PulseGenerator::new(
            self.step_pin,
            self.dir_pin,
            self.delay,
            self.microsteps,
        );
        (generator, self.reset_pin, self.microstep_pins)
    }

    /// Give all pins and the delay back.
    pub fn release(self) -> (STEP, DIR, RST, MS, DELAY) {
        (
            self.step_pin,
            self.dir_pin,
            self.reset_pin,
            self.microstep_pins,
            self.delay,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn test_microstep_select_lines() {
        let mut ms1 = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let mut ms2 = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let mut ms3 = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);

        let mut pins = MicrostepPins::new(ms1.clone(), ms2.clone(), ms3.clone());
        pins.select(Microsteps::SIXTEENTH).unwrap();
        pins.select(Microsteps::FULL).unwrap();

        ms1.done();
        ms2.done();
        ms3.done();
    }

    #[test]
    fn test_power_on_levels_and_pulse() {
        let mut step = PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let mut dir = PinMock::new(&[Transaction::set(State::High)]);
        let mut reset = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ]);
        let mut ms1 = PinMock::new(&[Transaction::set(State::Low)]);
        let mut ms2 = PinMock::new(&[Transaction::set(State::Low)]);
        let mut ms3 = PinMock::new(&[Transaction::set(State::Low)]);

        let mut driver = A4988::new(
            step.clone(),
            dir.clone(),
            reset.clone(),
            MicrostepPins::new(ms1.clone(), ms2.clone(), ms3.clone()),
            NoopDelay::new(),
        )
        .unwrap();

        driver.pulse().unwrap();
        driver.go_limp(&mut NoopDelay::new(), 1000).unwrap();
        // Already Forward: no DIR write.
        driver.set_direction(Direction::Forward).unwrap();

        step.done();
        dir.done();
        reset.done();
        ms1.done();
        ms2.done();
        ms3.done();
    }
}
