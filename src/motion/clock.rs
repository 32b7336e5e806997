//! Low-priority wall clock.

use crate::motor::{overflow_preload, ControllerState, StepTimer};

/// Timer ticks between wall-clock interrupts (2 ms at 1 MHz).
pub const WALL_CLOCK_TICKS: u16 = 2000;

/// Register preload for an up-counting overflow timer.
pub const WALL_CLOCK_PRELOAD: u16 = overflow_preload(WALL_CLOCK_TICKS);

/// Monotonic tick counter, independent of step timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    period: u16,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new(WALL_CLOCK_TICKS)
    }
}

impl WallClock {
    /// Create a clock that fires every `period` timer ticks.
    pub const fn new(period: u16) -> Self {
        Self { period }
    }

    /// Timer ticks between firings.
    #[inline]
    pub fn period(&self) -> u16 {
        self.period
    }

    /// Timer interrupt handler. Returns the new clock value.
    pub fn on_timer<T: StepTimer>(&self, state: &ControllerState, timer: &mut T) -> u32 {
        timer.reload(self.period);
        state.tick_clock()
    }
}
