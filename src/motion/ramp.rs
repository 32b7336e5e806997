//! Sawtooth speed ramp.
//!
//! The ramp raises the speed by a fixed increment every tick and wraps back to
//! the minimum once it passes the maximum. Each new speed is published to the
//! pulse generator as a per-microstep delay. The persisted delay value is
//! written back at most once per pass of the main loop.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::config::persisted::{write_field, ConfigStore, Field};
use crate::config::units::Microsteps;
use crate::config::{BoardConfig, SpeedLimits, TIMER_TICK_HZ};
use crate::error::Result;
use crate::motor::{ControllerState, OperatorInput};

/// Timer ticks per full step at `speed` full steps per second.
///
/// Saturates at `u16::MAX` for speeds too slow to fit (including 0).
#[inline]
pub fn calculate_delay(speed: u16) -> u16 {
    if speed == 0 {
        return u16::MAX;
    }
    (TIMER_TICK_HZ / speed as u32).min(u16::MAX as u32) as u16
}

/// Speed and the delays derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampState {
    /// Full steps per second.
    pub speed: u16,
    /// Timer ticks per full step.
    pub delay_value: u16,
    /// Timer ticks per microstep.
    pub delay_counter: u16,
}

impl RampState {
    /// Derive the delays for `speed`.
    pub fn at_speed(speed: u16, microsteps: Microsteps) -> Self {
        let delay_value = calculate_delay(speed);
        Self {
            speed,
            delay_value,
            delay_counter: delay_value / microsteps.value() as u16,
        }
    }

    /// Resume from a persisted delay value.
    ///
    /// The speed implied by `delay_value` is clamped into `limits`, and both
    /// delays are recomputed from the clamped speed.
    pub fn from_delay_value(delay_value: u16, limits: &SpeedLimits, microsteps: Microsteps) -> Self {
        let implied = TIMER_TICK_HZ / delay_value.max(1) as u32;
        let speed = limits.clamp(implied.min(u16::MAX as u32) as u16);
        Self::at_speed(speed, microsteps)
    }
}

/// Main-loop speed ramp.
#[derive(Debug, Clone)]
pub struct RampController {
    limits: SpeedLimits,
    tick_ms: u32,
    microsteps: Microsteps,
    ramp: RampState,
    dirty: bool,
}

impl RampController {
    /// Create a ramp starting from `ramp`.
    ///
    /// `microsteps` must be the divisor the pulse generator counts with.
    pub fn new(config: &BoardConfig, ramp: RampState, microsteps: Microsteps) -> Self {
        Self {
            limits: config.speed,
            tick_ms: config.timing.ramp_tick_ms,
            microsteps,
            ramp,
            dirty: false,
        }
    }

    /// Current speed in full steps per second.
    #[inline]
    pub fn speed(&self) -> u16 {
        self.ramp.speed
    }

    /// Current speed and delays.
    #[inline]
    pub fn state(&self) -> RampState {
        self.ramp
    }

    /// Whether the delay value changed since the last flush.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Advance one tick and publish the new delay counter.
    pub fn tick(&mut self, state: &ControllerState) -> u16 {
        let mut speed = self.ramp.speed.saturating_add(self.limits.increment);
        if speed > self.limits.max {
            speed = self.limits.min;
            debug!("ramp wrapped to {}", speed);
        }

        self.ramp = RampState::at_speed(speed, self.microsteps);
        state.set_delay_counter(self.ramp.delay_counter);
        self.dirty = true;
        speed
    }

    /// Tick until the input is asserted or a hold is requested.
    ///
    /// Returns the number of ticks taken. Returns at once, without changing
    /// the speed, if either condition already holds.
    pub fn run_phase<I, D>(
        &mut self,
        input: &mut OperatorInput<I>,
        delay: &mut D,
        state: &ControllerState,
    ) -> Result<u32>
    where
        I: InputPin,
        D: DelayNs,
    {
        let mut ticks = 0u32;
        while !state.hold_pending() && !input.is_asserted()? {
            delay.delay_ms(self.tick_ms);
            self.tick(state);
            ticks = ticks.wrapping_add(1);
        }
        Ok(ticks)
    }

    /// Persist the delay value if it changed. Returns whether a write happened.
    pub fn flush<S: ConfigStore>(&mut self, store: &mut S) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        write_field(store, Field::DelayValue, self.ramp.delay_value)?;
        self.dirty = false;
        Ok(true)
    }

    /// One pass of the main loop: ramp, then flush.
    pub fn service<I, D, S>(
        &mut self,
        input: &mut OperatorInput<I>,
        delay: &mut D,
        state: &ControllerState,
        store: &mut S,
    ) -> Result<u32>
    where
        I: InputPin,
        D: DelayNs,
        S: ConfigStore,
    {
        let ticks = self.run_phase(input, delay, state)?;
        self.flush(store)?;
        Ok(ticks)
    }

    /// Run the main loop forever. Only returns on a hardware error.
    pub fn run<I, D, S>(
        &mut self,
        input: &mut OperatorInput<I>,
        delay: &mut D,
        state: &ControllerState,
        store: &mut S,
    ) -> Result<Infallible>
    where
        I: InputPin,
        D: DelayNs,
        S: ConfigStore,
    {
        loop {
            self.service(input, delay, state, store)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::persisted::read_field;
    use crate::config::ActiveLevel;
    use crate::sim::{MemoryStore, ScriptedInput, SimDelay};
    use proptest::prelude::*;

    fn controller_at(speed: u16) -> RampController {
        RampController::new(
            &BoardConfig::default(),
            RampState::at_speed(speed, Microsteps::SIXTEENTH),
            Microsteps::SIXTEENTH,
        )
    }

    fn input(segments: &[(bool, u32)]) -> OperatorInput<ScriptedInput> {
        OperatorInput::new(ScriptedInput::new(segments), ActiveLevel::High)
    }

    #[test]
    fn test_calculate_delay() {
        assert_eq!(calculate_delay(100), 10_000);
        assert_eq!(calculate_delay(50), 20_000);
        assert_eq!(calculate_delay(400), 2_500);
        assert_eq!(calculate_delay(10), u16::MAX);
        assert_eq!(calculate_delay(0), u16::MAX);
    }

    #[test]
    fn test_state_at_speed() {
        let ramp = RampState::at_speed(100, Microsteps::SIXTEENTH);
        assert_eq!(ramp.delay_value, 10_000);
        assert_eq!(ramp.delay_counter, 625);
    }

    #[test]
    fn test_resume_from_delay_value() {
        let limits = SpeedLimits::default();

        let ramp = RampState::from_delay_value(10_000, &limits, Microsteps::SIXTEENTH);
        assert_eq!(ramp.speed, 100);

        // Erased storage implies a speed below the range.
        let ramp = RampState::from_delay_value(0xFFFF, &limits, Microsteps::SIXTEENTH);
        assert_eq!(ramp.speed, 50);
        assert_eq!(ramp.delay_value, 20_000);
        assert_eq!(ramp.delay_counter, 1_250);

        let ramp = RampState::from_delay_value(0, &limits, Microsteps::SIXTEENTH);
        assert_eq!(ramp.speed, 400);
    }

    #[test]
    fn test_sawtooth_wraps_on_tick_351() {
        let state = ControllerState::new();
        let mut ramp = controller_at(50);

        for n in 1..=350u16 {
            assert_eq!(ramp.tick(&state), 50 + n);
        }
        assert_eq!(ramp.speed(), 400);
        assert_eq!(state.delay_counter(), 2_500 / 16);

        assert_eq!(ramp.tick(&state), 50);
        assert_eq!(state.delay_counter(), 1_250);
    }

    #[test]
    fn test_run_phase_stops_on_input() {
        let state = ControllerState::new();
        let mut ramp = controller_at(50);
        let mut delay = SimDelay::new();
        let mut pause = input(&[(false, 10), (true, 1)]);

        let ticks = ramp.run_phase(&mut pause, &mut delay, &state).unwrap();

        assert_eq!(ticks, 10);
        assert_eq!(ramp.speed(), 60);
        assert_eq!(delay.elapsed_ms(), 150);
    }

    #[test]
    fn test_pause_freezes_speed() {
        let state = ControllerState::new();
        let mut ramp = controller_at(120);
        let mut delay = SimDelay::new();
        let mut pause = input(&[(true, 0)]);

        for _ in 0..5 {
            assert_eq!(ramp.run_phase(&mut pause, &mut delay, &state).unwrap(), 0);
        }
        assert_eq!(ramp.speed(), 120);
        assert!(!ramp.is_dirty());
        assert_eq!(delay.elapsed_ns(), 0);
    }

    #[test]
    fn test_hold_freezes_without_sampling_input() {
        let state = ControllerState::new();
        let mut ramp = controller_at(120);
        let mut delay = SimDelay::new();
        let mut pause = input(&[(false, 0)]);

        state.request_hold();
        assert_eq!(ramp.run_phase(&mut pause, &mut delay, &state).unwrap(), 0);
        assert_eq!(ramp.speed(), 120);
        assert_eq!(pause.release().reads(), 0);
    }

    #[test]
    fn test_flush_is_coalesced() {
        let state = ControllerState::new();
        let mut ramp = controller_at(50);
        let mut delay = SimDelay::new();
        let mut store = MemoryStore::new();
        let mut pause = input(&[(false, 10), (true, 1)]);

        ramp.service(&mut pause, &mut delay, &state, &mut store).unwrap();
        assert_eq!(store.writes(), 2);
        assert_eq!(read_field(&mut store, Field::DelayValue).unwrap(), 16_666);

        // Paused: no ticks, nothing to write.
        ramp.service(&mut pause, &mut delay, &state, &mut store).unwrap();
        assert_eq!(store.writes(), 2);
    }

    proptest! {
        #[test]
        fn prop_speed_stays_in_range(
            start in 50u16..=400,
            increment in 1u16..=64,
            ticks in 0usize..2000,
        ) {
            let mut config = BoardConfig::default();
            config.speed.increment = increment;
            let mut ramp = RampController::new(
                &config,
                RampState::at_speed(start, Microsteps::SIXTEENTH),
                Microsteps::SIXTEENTH,
            );
            let state = ControllerState::new();

            for _ in 0..ticks {
                let speed = ramp.tick(&state);
                prop_assert!(config.speed.contains(speed));
                prop_assert_eq!(state.delay_counter(), calculate_delay(speed) / 16);
            }
        }
    }
}
