//! Configuration module for stepper-oscillator.
//!
//! Two kinds of configuration live here: the board configuration (speed
//! range, timings, driver settings) loaded from TOML with the `std` feature or
//! built from defaults, and the persisted record (travel limit, delay value,
//! start offset) kept in the board's byte store.

mod board;
#[cfg(feature = "std")]
mod loader;
pub mod persisted;
pub mod units;
mod validation;

pub use board::{
    BoardConfig, DriverSettings, SpeedLimits, Timing, CALIBRATION_STEP_MS, HOMING_STEP_MS,
    LIMP_MS, MAX_SPEED, MIN_SPEED, PULSE_WIDTH_US, RAMP_TICK_MS, SPEED_INCREMENT, TIMER_TICK_HZ,
};
pub use persisted::{ConfigStore, Field, PersistedConfig};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

pub use units::{ActiveLevel, Microsteps};
