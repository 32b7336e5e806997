//! # stepper-oscillator
//!
//! Firmware core for an A4988-class stepper board that oscillates a motor
//! back and forth over a calibrated travel range with a sawtooth speed ramp.
//!
//! ## Features
//!
//! - **embedded-hal 1.0**: `OutputPin` for STEP/DIR/RESET/MS, `InputPin` for the
//!   operator input, `DelayNs` for blocking waits and the pulse width
//! - **no_std compatible**: Core library works without standard library
//! - **Interrupt-safe state**: one `const`-constructible [`ControllerState`]
//!   of single-writer atomics, suitable for a `static`
//! - **Persisted calibration**: travel limit, start offset, and ramp speed
//!   survive power cycles in any byte store implementing [`ConfigStore`]
//! - **Simulated hardware**: the [`sim`] module runs the whole sequence
//!   without a board
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_oscillator::{A4988Builder, BoardConfig, Controller, ControllerState, MicrostepPins};
//!
//! static STATE: ControllerState = ControllerState::new();
//!
//! let mut driver = A4988Builder::new()
//!     .step_pin(step)
//!     .dir_pin(dir)
//!     .reset_pin(reset)
//!     .microstep_pins(MicrostepPins::new(ms1, ms2, ms3))
//!     .delay(pulse_delay)
//!     .build()?;
//!
//! let controller = Controller::new(&STATE, BoardConfig::default())?;
//! let report = controller.boot(&mut input, &mut driver, &mut delay, &mut eeprom)?;
//! let mut armed = controller.arm(driver, &report);
//!
//! // Step timer ISR:  armed.generator.on_timer(&STATE, &mut step_timer)
//! // Clock timer ISR: WallClock::default().on_timer(&STATE, &mut clock_timer)
//! armed.ramp.run(&mut input, &mut delay, &STATE, &mut eeprom)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML configuration loading
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod sim;

// Re-exports for ergonomic API
pub use config::{
    validate_config, BoardConfig, ConfigStore, Field, PersistedConfig, SpeedLimits, Timing,
};
pub use error::{Error, Result};
pub use motion::{calculate_delay, RampController, RampState, WallClock};
pub use motor::{
    state, A4988Builder, Armed, BootReport, CalibrationPhase, CalibrationResult, Calibrator,
    Controller, ControllerState, Direction, MicrostepPins, MicrostepSelect, MotorSnapshot,
    OperatorInput, PulseGenerator, StepTimer, A4988,
};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{ActiveLevel, Microsteps};
