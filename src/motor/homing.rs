//! Operator calibration and the homing move.
//!
//! Calibration runs once at boot, before the controller is armed, and only
//! when the operator input is asserted at reset. The operator holds the input
//! while the motor steps to mark the start offset, releases, then holds again
//! to mark the travel range. Both counts are persisted. Homing always runs
//! afterwards and drives the motor from its power-on rest position to the
//! zero position.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::persisted::{write_field, ConfigStore, Field};
use crate::config::units::Microsteps;
use crate::config::Timing;
use crate::error::Result;

use super::driver::{MicrostepSelect, A4988};
use super::input::OperatorInput;
use super::state::{ControllerState, Direction};

/// Phase of the calibration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationPhase {
    /// Entry: clear the step counter and switch to full steps.
    Idle,
    /// Waiting for the first press.
    WaitPress,
    /// Stepping while held to measure the start offset.
    MeasureOffset,
    /// Storing the start offset.
    PersistOffset,
    /// Waiting for the second press.
    WaitPress2,
    /// Stepping while held to measure the travel range.
    MeasureRange,
    /// Waiting for the input to be released.
    WaitRelease,
    /// Storing the travel range.
    PersistRange,
    /// Sequence finished.
    Done,
}

impl CalibrationPhase {
    /// Whether this phase consumes an input sample.
    #[inline]
    pub fn samples_input(self) -> bool {
        matches!(
            self,
            CalibrationPhase::WaitPress
                | CalibrationPhase::MeasureOffset
                | CalibrationPhase::WaitPress2
                | CalibrationPhase::MeasureRange
                | CalibrationPhase::WaitRelease
        )
    }
}

/// Values learned by calibration (or loaded from storage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationResult {
    /// Full steps from the rest position to the zero position.
    pub start_offset: u16,
    /// Full steps travelled before reversing.
    pub travel_limit: u16,
}

/// Calibration state machine.
///
/// Advanced one transition at a time by [`poll`](Self::poll), or run to
/// completion against a real input with [`run`](Self::run).
#[derive(Debug, Clone)]
pub struct Calibrator {
    phase: CalibrationPhase,
    result: CalibrationResult,
    step_ms: u32,
}

impl Calibrator {
    /// Create a calibrator in the Idle phase.
    pub fn new(timing: &Timing) -> Self {
        Self {
            phase: CalibrationPhase::Idle,
            result: CalibrationResult::default(),
            step_ms: timing.calibration_step_ms,
        }
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// The result, once the sequence is done.
    pub fn result(&self) -> Option<CalibrationResult> {
        (self.phase == CalibrationPhase::Done).then_some(self.result)
    }

    /// Perform one transition.
    ///
    /// `asserted` is the current input sample; phases that don't sample the
    /// input ignore it. Measuring phases emit one full step and wait the
    /// calibration step interval per call while the input stays asserted.
    pub fn poll<STEP, DIR, RST, MS, DRVDELAY, D, S>(
        &mut self,
        asserted: bool,
        state: &ControllerState,
        driver: &mut A4988<STEP, DIR, RST, MS, DRVDELAY>,
        delay: &mut D,
        store: &mut S,
    ) -> Result<CalibrationPhase>
    where
        STEP: OutputPin,
        DIR: OutputPin,
        RST: OutputPin,
        MS: MicrostepSelect,
        DRVDELAY: DelayNs,
        D: DelayNs,
        S: ConfigStore,
    {
        use CalibrationPhase::*;

        let next = match self.phase {
            Idle => {
                state.set_step_counter(0);
                driver.set_microsteps(Microsteps::FULL)?;
                WaitPress
            }
            WaitPress if asserted => MeasureOffset,
            WaitPress2 if asserted => MeasureRange,
            WaitPress | WaitPress2 => self.phase,
            MeasureOffset | MeasureRange if asserted => {
                state.set_step_counter(state.step_counter().wrapping_add(1));
                driver.step_and_wait(delay, self.step_ms)?;
                self.phase
            }
            MeasureOffset => PersistOffset,
            MeasureRange => WaitRelease,
            PersistOffset => {
                self.result.start_offset = state.step_counter();
                write_field(store, Field::StartOffset, self.result.start_offset)?;
                state.set_step_counter(0);
                WaitPress2
            }
            WaitRelease if !asserted => PersistRange,
            WaitRelease => WaitRelease,
            PersistRange => {
                self.result.travel_limit = state.step_counter();
                write_field(store, Field::TravelLimit, self.result.travel_limit)?;
                state.set_step_counter(0);
                Done
            }
            Done => Done,
        };

        if next != self.phase {
            debug!("calibration {} -> {}", self.phase, next);
        }
        self.phase = next;
        Ok(next)
    }

    /// Run the whole sequence, busy-polling the operator input.
    ///
    /// Blocks for as long as the operator takes; there is no timeout.
    pub fn run<I, STEP, DIR, RST, MS, DRVDELAY, D, S>(
        mut self,
        input: &mut OperatorInput<I>,
        state: &ControllerState,
        driver: &mut A4988<STEP, DIR, RST, MS, DRVDELAY>,
        delay: &mut D,
        store: &mut S,
    ) -> Result<CalibrationResult>
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
        info!("calibration started");
        loop {
            let asserted = match self.phase {
                CalibrationPhase::WaitPress | CalibrationPhase::WaitPress2 => {
                    input.wait_for(true)?;
                    true
                }
                CalibrationPhase::WaitRelease => {
                    input.wait_for(false)?;
                    false
                }
                phase if phase.samples_input() => input.is_asserted()?,
                _ => false,
            };
            if self.poll(asserted, state, driver, delay, store)? == CalibrationPhase::Done {
                info!(
                    "calibrated start_offset={} travel_limit={}",
                    self.result.start_offset,
                    self.result.travel_limit
                );
                return Ok(self.result);
            }
        }
    }
}

/// Drive the motor to the zero position.
///
/// Resets the driver so the motor goes limp and settles, then steps forward
/// `start_offset` full steps. Leaves the step counter at 0 and the driver in
/// `microsteps` mode.
pub fn home<STEP, DIR, RST, MS, DRVDELAY, D>(
    state: &ControllerState,
    driver: &mut A4988<STEP, DIR, RST, MS, DRVDELAY>,
    delay: &mut D,
    start_offset: u16,
    timing: &Timing,
    microsteps: Microsteps,
) -> Result<()>
where
    STEP: OutputPin,
    DIR: OutputPin,
    RST: OutputPin,
    MS: MicrostepSelect,
    DRVDELAY: DelayNs,
    D: DelayNs,
{
    info!("homing to offset {}", start_offset);
    driver.go_limp(delay, timing.limp_ms)?;
    driver.set_direction(Direction::Forward)?;

    state.set_step_counter(0);
    while state.step_counter() < start_offset {
        state.set_step_counter(state.step_counter() + 1);
        driver.step_and_wait(delay, timing.homing_step_ms)?;
    }

    state.set_step_counter(0);
    state.set_sub_step_counter(0);
    driver.set_microsteps(microsteps)?;
    info!("homed");
    Ok(())
}
