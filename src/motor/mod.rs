//! Motor module for stepper-oscillator.
//!
//! Provides the A4988 driver, the interrupt-side pulse generator, the
//! calibration and homing sequence, and the shared controller state.

mod builder;
mod driver;
pub mod homing;
mod input;
mod pulse;
pub mod state;
mod system;

pub use builder::A4988Builder;
pub use driver::{MicrostepPins, MicrostepSelect, A4988};
pub use homing::{home, CalibrationPhase, CalibrationResult, Calibrator};
pub use input::OperatorInput;
pub use pulse::{overflow_preload, PulseGenerator, StepTimer};
pub use state::{ControllerState, Direction, MotorSnapshot};
pub use system::{Armed, BootReport, Controller};
