//! Interrupt-context pulse generation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::Microsteps;
use crate::config::PULSE_WIDTH_US;
use crate::error::{MotorError, Result};

use super::state::ControllerState;

/// Periodic hardware timer driving the pulse generator.
///
/// The countdown is in timer ticks (1 MHz, so microseconds).
pub trait StepTimer {
    /// Schedule the next firing `ticks` from now.
    fn reload(&mut self, ticks: u16);
}

/// Preload value for a 16-bit up-counting timer that fires on overflow.
#[inline]
pub const fn overflow_preload(ticks: u16) -> u16 {
    0xFFFF - ticks
}

/// Produces one microstep pulse per timer firing and reverses at the travel
/// limit.
pub struct PulseGenerator<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    step_pin: STEP,
    dir_pin: DIR,
    delay: DELAY,
    microsteps: Microsteps,
}

impl<STEP, DIR, DELAY> PulseGenerator<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    pub(crate) fn new(
        step_pin: STEP,
        dir_pin: DIR,
        delay: DELAY,
        microsteps: Microsteps,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            microsteps,
        }
    }

    /// Microstep divisor the generator counts with.
    #[inline]
    pub fn microsteps(&self) -> Microsteps {
        self.microsteps
    }

    /// Timer interrupt handler.
    ///
    /// Reloads the timer from the current delay counter, pulses the step
    /// line, advances the counters, and reverses when the step counter
    /// exceeds the travel limit. The delay counter is not validated; zero
    /// gives the fastest rate the timer allows.
    pub fn on_timer<T: StepTimer>(&mut self, state: &ControllerState, timer: &mut T) -> Result<()> {
        timer.reload(state.delay_counter());

        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(PULSE_WIDTH_US);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;

        let mut sub_step = state.sub_step_counter() + 1;
        let mut step = state.step_counter();
        if sub_step >= self.microsteps.value() {
            sub_step = 0;
            step = step.wrapping_add(1);
        }
        // The pulse is out: count it even if the reversal below fails.
        state.set_sub_step_counter(sub_step);
        state.set_step_counter(step);

        if step > state.travel_limit() {
            let direction = state.direction().reversed();
            if direction.pin_level() {
                self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
            } else {
                self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
            }
            state.set_direction(direction);
            state.set_step_counter(0);
            trace!("reversed to {}", direction);
        }

        Ok(())
    }

    /// Give the pins and delay back.
    pub fn release(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }
}
