//! Motion module for stepper-oscillator.
//!
//! Provides the main-loop speed ramp and the wall clock.

mod clock;
mod ramp;

pub use clock::{WallClock, WALL_CLOCK_PRELOAD, WALL_CLOCK_TICKS};
pub use ramp::{calculate_delay, RampController, RampState};
