//! Controller state shared between interrupt and main-loop contexts.
//!
//! Each field has exactly one writer once the controller is armed:
//!
//! | field                                   | writer          |
//! |-----------------------------------------|-----------------|
//! | direction, step/sub-step counters       | pulse generator |
//! | delay counter, hold flag                | main loop       |
//! | clock                                   | wall clock      |
//! | travel limit                            | boot only       |
//!
//! Before arming, the boot sequence writes the counters directly. Fields are
//! atomics so the record can live in a `static` and be read from any context
//! without locks.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Away from the zero position (DIR pin high).
    #[default]
    Forward,
    /// Back toward the zero position (DIR pin low).
    Reverse,
}

impl Direction {
    /// Get the opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Level of the DIR pin for this direction.
    #[inline]
    pub fn pin_level(self) -> bool {
        matches!(self, Direction::Forward)
    }

    #[inline]
    fn from_pin_level(high: bool) -> Self {
        if high {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// Point-in-time copy of the motor position fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorSnapshot {
    /// Current direction of travel.
    pub direction: Direction,
    /// Full steps since the last reversal.
    pub step_counter: u16,
    /// Microsteps into the current full step.
    pub sub_step_counter: u8,
}

/// The controller-state record.
#[derive(Debug)]
pub struct ControllerState {
    direction: AtomicBool,
    step_counter: AtomicU16,
    sub_step_counter: AtomicU8,
    travel_limit: AtomicU16,
    delay_counter: AtomicU16,
    hold: AtomicBool,
    clock: AtomicU32,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerState {
    /// Create a zeroed state, direction Forward.
    pub const fn new() -> Self {
        Self {
            direction: AtomicBool::new(true),
            step_counter: AtomicU16::new(0),
            sub_step_counter: AtomicU8::new(0),
            travel_limit: AtomicU16::new(0),
            delay_counter: AtomicU16::new(0),
            hold: AtomicBool::new(false),
            clock: AtomicU32::new(0),
        }
    }

    /// Copy the motor position fields.
    pub fn motor(&self) -> MotorSnapshot {
        MotorSnapshot {
            direction: self.direction(),
            step_counter: self.step_counter(),
            sub_step_counter: self.sub_step_counter(),
        }
    }

    /// Current direction of travel.
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_pin_level(self.direction.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn set_direction(&self, direction: Direction) {
        self.direction.store(direction.pin_level(), Ordering::Relaxed);
    }

    /// Full steps since the last reversal (or since homing).
    #[inline]
    pub fn step_counter(&self) -> u16 {
        self.step_counter.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_step_counter(&self, steps: u16) {
        self.step_counter.store(steps, Ordering::Relaxed);
    }

    /// Microsteps into the current full step.
    #[inline]
    pub fn sub_step_counter(&self) -> u8 {
        self.sub_step_counter.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_sub_step_counter(&self, microsteps: u8) {
        self.sub_step_counter.store(microsteps, Ordering::Relaxed);
    }

    /// Full steps travelled before reversing.
    #[inline]
    pub fn travel_limit(&self) -> u16 {
        self.travel_limit.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_travel_limit(&self, steps: u16) {
        self.travel_limit.store(steps, Ordering::Relaxed);
    }

    /// Timer ticks between microstep pulses.
    #[inline]
    pub fn delay_counter(&self) -> u16 {
        self.delay_counter.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_delay_counter(&self, ticks: u16) {
        self.delay_counter.store(ticks, Ordering::Relaxed);
    }

    /// Freeze the ramp at its current speed until [`release_hold`](Self::release_hold).
    #[inline]
    pub fn request_hold(&self) {
        self.hold.store(true, Ordering::Relaxed);
    }

    /// Let the ramp resume.
    #[inline]
    pub fn release_hold(&self) {
        self.hold.store(false, Ordering::Relaxed);
    }

    /// Whether a manual hold is pending.
    #[inline]
    pub fn hold_pending(&self) -> bool {
        self.hold.load(Ordering::Relaxed)
    }

    /// Wall-clock ticks since arming (wraps).
    #[inline]
    pub fn clock(&self) -> u32 {
        self.clock.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn tick_clock(&self) -> u32 {
        self.clock.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}
