//! Error types for stepper-oscillator.
//!
//! Provides unified error handling across configuration, driver I/O, and the
//! persisted configuration store.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-oscillator operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Driver pin or timer error
    Motor(MotorError),
    /// Persisted configuration store error
    Storage(StorageError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (A4988 accepts 1, 2, 4, 8, 16)
    InvalidMicrosteps(u16),
    /// Minimum speed must be > 0 and not above the maximum
    InvalidSpeedRange {
        /// Configured minimum speed (steps/s)
        min: u16,
        /// Configured maximum speed (steps/s)
        max: u16,
    },
    /// Minimum speed is so low its per-step delay overflows 16 bits
    SpeedTooLow {
        /// Configured minimum speed (steps/s)
        min: u16,
    },
    /// Speed increment must be > 0
    InvalidSpeedIncrement(u16),
    /// Maximum speed would make the per-microstep delay zero
    SpeedTooHigh {
        /// Configured maximum speed (steps/s)
        max: u16,
        /// Microstep divisor in use
        microsteps: u16,
    },
    /// Ramp tick must be > 0 ms
    InvalidRampTick,
    /// A required driver pin was not supplied to the builder
    MissingPin(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Driver operation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Output pin operation failed
    PinError,
    /// Operator input could not be read
    InputError,
}

/// Persisted store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Reading a byte failed
    Read {
        /// Byte address
        address: u16,
    },
    /// Writing a byte failed
    Write {
        /// Byte address
        address: u16,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16", v)
            }
            ConfigError::InvalidSpeedRange { min, max } => {
                write!(f, "Invalid speed range: min ({}) must be > 0 and <= max ({})", min, max)
            }
            ConfigError::SpeedTooLow { min } => write!(
                f,
                "Min speed {} steps/s needs more than 65535 timer ticks per step",
                min
            ),
            ConfigError::InvalidSpeedIncrement(v) => {
                write!(f, "Invalid speed increment: {}. Must be > 0", v)
            }
            ConfigError::SpeedTooHigh { max, microsteps } => write!(
                f,
                "Max speed {} steps/s leaves no timer ticks per microstep at 1/{} stepping",
                max, microsteps
            ),
            ConfigError::InvalidRampTick => write!(f, "Ramp tick must be > 0 ms"),
            ConfigError::MissingPin(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::InputError => write!(f, "Operator input read failed"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Read { address } => write!(f, "Read of byte {} failed", address),
            StorageError::Write { address } => write!(f, "Write of byte {} failed", address),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}
