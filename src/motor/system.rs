//! Controller facade: boot and arming.
//!
//! Ties the pieces together in the order the board runs them: load the
//! persisted record, calibrate if the operator asks for it, home, publish the
//! starting state, and finally hand the step and direction lines over to the
//! pulse generator.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{validate_config, BoardConfig, ConfigStore, PersistedConfig};
use crate::error::Result;
use crate::motion::{RampController, RampState};

use super::driver::{MicrostepSelect, A4988};
use super::homing::{home, Calibrator};
use super::input::OperatorInput;
use super::pulse::PulseGenerator;
use super::state::ControllerState;

/// What boot found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// Persisted record in effect, including any fresh calibration.
    pub persisted: PersistedConfig,
    /// Whether calibration ran.
    pub calibrated: bool,
    /// Starting ramp speed and delays.
    pub ramp: RampState,
}

/// Everything produced by arming.
pub struct Armed<STEP, DIR, RST, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Call from the step timer interrupt.
    pub generator: PulseGenerator<STEP, DIR, DELAY>,
    /// Run from the main loop.
    pub ramp: RampController,
    /// Driver reset line, left released.
    pub reset_pin: RST,
    /// Microstep select lines, left at the running divisor.
    pub microstep_pins: MS,
}

/// Boot and arming sequence for one board.
///
/// # Example
///
/// ```rust,ignore
/// static STATE: ControllerState = ControllerState::new();
///
/// let controller = Controller::new(&STATE, BoardConfig::default())?;
/// let report = controller.boot(&mut input, &mut driver, &mut delay, &mut eeprom)?;
/// let mut armed = controller.arm(driver, &report);
///
/// // Timer ISR: armed.generator.on_timer(&STATE, &mut timer)
/// armed.ramp.run(&mut input, &mut delay, &STATE, &mut eeprom)?;
/// ```
#[derive(Debug)]
pub struct Controller<'a> {
    state: &'a ControllerState,
    config: BoardConfig,
}

impl<'a> Controller<'a> {
    /// Create a controller over `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(state: &'a ControllerState, config: BoardConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self { state, config })
    }

    /// Board configuration in use.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Shared controller state.
    pub fn state(&self) -> &'a ControllerState {
        self.state
    }

    /// Run the boot sequence.
    ///
    /// Calibration runs only if `input` is asserted on the first sample. The
    /// homing move always runs and may take a long time if the start offset
    /// reads as erased storage.
    pub fn boot<I, STEP, DIR, RST, MS, DRVDELAY, D, S>(
        &self,
        input: &mut OperatorInput<I>,
        driver: &mut A4988<STEP, DIR, RST, MS, DRVDELAY>,
        delay: &mut D,
        store: &mut S,
    ) -> Result<BootReport>
    where
        I: InputPin,
        STEP: OutputPin,
        DIR: OutputPin,
        RST: OutputPin,
        MS: MicrostepSelect,
        DRVDELAY: DelayNs,
        D: DelayNs,
        S: ConfigStore,
    {
        let state = self.state;
        let mut persisted = PersistedConfig::load(store)?;

        let calibrated = input.is_asserted()?;
        if calibrated {
            let result = Calibrator::new(&self.config.timing).run(input, state, driver, delay, store)?;
            persisted.start_offset = result.start_offset;
            persisted.travel_limit = result.travel_limit;
        }

        let microsteps = self.config.driver.microsteps;
        home(
            state,
            driver,
            delay,
            persisted.start_offset,
            &self.config.timing,
            microsteps,
        )?;

        let ramp = RampState::from_delay_value(persisted.delay_value, &self.config.speed, microsteps);
        state.set_travel_limit(persisted.travel_limit);
        state.set_delay_counter(ramp.delay_counter);
        state.set_direction(driver.direction());
        state.set_step_counter(0);
        state.set_sub_step_counter(0);

        info!(
            "boot done: travel_limit={} speed={} delay_counter={}",
            persisted.travel_limit,
            ramp.speed,
            ramp.delay_counter
        );
        Ok(BootReport {
            persisted,
            calibrated,
            ramp,
        })
    }

    /// Move the step and direction lines into a pulse generator.
    ///
    /// Call once boot has finished and before enabling the step timer.
    pub fn arm<STEP, DIR, RST, MS, DELAY>(
        &self,
        driver: A4988<STEP, DIR, RST, MS, DELAY>,
        report: &BootReport,
    ) -> Armed<STEP, DIR, RST, MS, DELAY>
    where
        STEP: OutputPin,
        DIR: OutputPin,
        RST: OutputPin,
        MS: MicrostepSelect,
        DELAY: DelayNs,
    {
        let (generator, reset_pin, microstep_pins) = driver.into_pulse_generator();
        let ramp = RampController::new(&self.config, report.ramp, generator.microsteps());
        info!("armed at 1/{} microsteps", generator.microsteps().value());

        Armed {
            generator,
            ramp,
            reset_pin,
            microstep_pins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActiveLevel, Microsteps};
    use crate::error::{ConfigError, Error};
    use crate::motor::{A4988Builder, MicrostepPins};
    use crate::sim::{MemoryStore, ScriptedInput, SimDelay, SimPin};

    type SimDriver = A4988<SimPin, SimPin, SimPin, MicrostepPins<SimPin, SimPin, SimPin>, SimDelay>;

    fn sim_driver() -> SimDriver {
        A4988Builder::new()
            .step_pin(SimPin::new())
            .dir_pin(SimPin::new())
            .reset_pin(SimPin::new())
            .microstep_pins(MicrostepPins::new(SimPin::new(), SimPin::new(), SimPin::new()))
            .delay(SimDelay::new())
            .build()
            .unwrap()
    }

    fn stored(travel_limit: u16, delay_value: u16, start_offset: u16) -> MemoryStore {
        let mut store = MemoryStore::new();
        PersistedConfig {
            travel_limit,
            delay_value,
            start_offset,
        }
        .store(&mut store)
        .unwrap();
        store
    }

    #[test]
    fn test_rejects_invalid_config() {
        let state = ControllerState::new();
        let mut config = BoardConfig::default();
        config.speed.increment = 0;

        assert!(matches!(
            Controller::new(&state, config),
            Err(Error::Config(ConfigError::InvalidSpeedIncrement(0)))
        ));
    }

    #[test]
    fn test_boot_without_calibration() {
        let state = ControllerState::new();
        let controller = Controller::new(&state, BoardConfig::default()).unwrap();
        let mut store = stored(900, 10_000, 3);
        let mut input = OperatorInput::new(ScriptedInput::constant(true), ActiveLevel::Low);
        let mut driver = sim_driver();
        let mut delay = SimDelay::new();

        let report = controller
            .boot(&mut input, &mut driver, &mut delay, &mut store)
            .unwrap();

        assert!(!report.calibrated);
        assert_eq!(report.ramp.speed, 100);
        assert_eq!(state.travel_limit(), 900);
        assert_eq!(state.delay_counter(), 625);
        assert_eq!(state.step_counter(), 0);
        assert_eq!(driver.microsteps(), Microsteps::SIXTEENTH);
        assert_eq!(delay.elapsed_ms(), 1000 + 3 * 40);
    }

    #[test]
    fn test_arm_hands_over_pins() {
        let state = ControllerState::new();
        let controller = Controller::new(&state, BoardConfig::default()).unwrap();
        let mut store = stored(10, 2_500, 0);
        let mut input = OperatorInput::new(ScriptedInput::constant(false), ActiveLevel::High);
        let mut driver = sim_driver();
        let mut delay = SimDelay::new();

        let report = controller
            .boot(&mut input, &mut driver, &mut delay, &mut store)
            .unwrap();
        let armed = controller.arm(driver, &report);

        assert_eq!(armed.generator.microsteps(), Microsteps::SIXTEENTH);
        assert_eq!(armed.ramp.speed(), 400);
        assert!(armed.reset_pin.is_high());
    }
}
