//! Simulated board hardware.
//!
//! Deterministic stand-ins for the pins, delay, step timer, and byte store,
//! so boot, calibration, homing, and the ramp can run without a board. All
//! types are `no_std` and allocation-free.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

use crate::config::persisted::ConfigStore;
use crate::motor::StepTimer;

/// Output pin that records its level and rising edges.
#[derive(Debug, Clone, Default)]
pub struct SimPin {
    high: bool,
    rising_edges: u32,
    writes: u32,
}

impl SimPin {
    /// Create a pin that starts low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level.
    #[inline]
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of low-to-high transitions seen.
    #[inline]
    pub fn rising_edges(&self) -> u32 {
        self.rising_edges
    }

    /// Number of level writes, including redundant ones.
    #[inline]
    pub fn writes(&self) -> u32 {
        self.writes
    }

    fn set(&mut self, high: bool) {
        if high && !self.high {
            self.rising_edges += 1;
        }
        self.high = high;
        self.writes += 1;
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// Maximum number of segments in an input script.
pub const MAX_SEGMENTS: usize = 16;

/// Input pin that replays a script of levels.
///
/// Each segment holds a level for a number of reads. After the script is
/// exhausted the last level is held forever.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    segments: heapless::Vec<(bool, u32), MAX_SEGMENTS>,
    index: usize,
    remaining: u32,
    last: bool,
    reads: u32,
}

impl ScriptedInput {
    /// Create an input from `(level, reads)` segments.
    ///
    /// Segments beyond [`MAX_SEGMENTS`] are ignored.
    pub fn new(segments: &[(bool, u32)]) -> Self {
        let mut script = heapless::Vec::new();
        for &segment in segments.iter().take(MAX_SEGMENTS) {
            let _ = script.push(segment);
        }
        let remaining = script.first().map(|&(_, n)| n).unwrap_or(0);
        let last = script.first().map(|&(level, _)| level).unwrap_or(false);
        Self {
            segments: script,
            index: 0,
            remaining,
            last,
            reads: 0,
        }
    }

    /// Create an input that always reads the same level.
    pub fn constant(high: bool) -> Self {
        Self::new(&[(high, 0)])
    }

    /// Total reads so far.
    #[inline]
    pub fn reads(&self) -> u32 {
        self.reads
    }

    fn next_level(&mut self) -> bool {
        self.reads += 1;
        while self.remaining == 0 && self.index + 1 < self.segments.len() {
            self.index += 1;
            self.remaining = self.segments[self.index].1;
        }
        if let Some(&(level, _)) = self.segments.get(self.index) {
            self.last = level;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.last
    }
}

impl ErrorType for ScriptedInput {
    type Error = Infallible;
}

impl InputPin for ScriptedInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.next_level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.next_level())
    }
}

/// Delay that only accumulates elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimDelay {
    elapsed_ns: u64,
}

impl SimDelay {
    /// Create a delay at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time in nanoseconds.
    #[inline]
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }

    /// Total simulated time in whole milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

/// Step timer that records reloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimTimer {
    last: Option<u16>,
    reloads: u32,
}

impl SimTimer {
    /// Create a timer with no reloads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Countdown from the most recent reload.
    #[inline]
    pub fn last_reload(&self) -> Option<u16> {
        self.last
    }

    /// Number of reloads.
    #[inline]
    pub fn reloads(&self) -> u32 {
        self.reloads
    }
}

impl StepTimer for SimTimer {
    fn reload(&mut self, ticks: u16) {
        self.last = Some(ticks);
        self.reloads += 1;
    }
}

/// Size of the simulated EEPROM.
pub const STORE_SIZE: usize = 256;

/// Store write failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

/// In-memory byte store, erased (`0xFF`) on creation.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bytes: [u8; STORE_SIZE],
    writes: u32,
    fail_from: Option<u16>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an erased store.
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; STORE_SIZE],
            writes: 0,
            fail_from: None,
        }
    }

    /// Raw contents.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of byte writes performed.
    #[inline]
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Make writes to `address` and above fail, as if power were lost.
    pub fn fail_writes_from(&mut self, address: u16) {
        self.fail_from = Some(address);
    }
}

impl ConfigStore for MemoryStore {
    type Error = OutOfRange;

    fn read_byte(&mut self, address: u16) -> Result<u8, Self::Error> {
        self.bytes.get(address as usize).copied().ok_or(OutOfRange)
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Self::Error> {
        if self.fail_from.map_or(false, |from| address >= from) {
            return Err(OutOfRange);
        }
        let slot = self.bytes.get_mut(address as usize).ok_or(OutOfRange)?;
        *slot = value;
        self.writes += 1;
        Ok(())
    }
}
