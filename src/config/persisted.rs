//! Persisted configuration in byte-addressable non-volatile storage.
//!
//! Three 16-bit fields live at fixed addresses, each stored as two bytes with
//! the low byte first. Fields are written one byte at a time; a power loss
//! between the two writes leaves the field half-updated.

use crate::error::{Result, StorageError};

/// Byte-addressable non-volatile storage (EEPROM or emulation).
pub trait ConfigStore {
    /// Store-specific error type.
    type Error: core::fmt::Debug;

    /// Read one byte.
    fn read_byte(&mut self, address: u16) -> core::result::Result<u8, Self::Error>;

    /// Write one byte.
    fn write_byte(&mut self, address: u16, value: u8) -> core::result::Result<(), Self::Error>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &mut T {
    type Error = T::Error;

    #[inline]
    fn read_byte(&mut self, address: u16) -> core::result::Result<u8, Self::Error> {
        T::read_byte(self, address)
    }

    #[inline]
    fn write_byte(&mut self, address: u16, value: u8) -> core::result::Result<(), Self::Error> {
        T::write_byte(self, address, value)
    }
}

/// Value an erased EEPROM field reads back as.
pub const ERASED_FIELD: u16 = 0xFFFF;

/// A persisted 16-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Full steps travelled before reversing.
    TravelLimit,
    /// Timer ticks per full step at the last ramp speed.
    DelayValue,
    /// Full steps from the power-on rest position to the zero position.
    StartOffset,
}

impl Field {
    /// All fields in address order.
    pub const ALL: [Field; 3] = [Field::TravelLimit, Field::DelayValue, Field::StartOffset];

    /// Address of the field's low byte; the high byte follows it.
    #[inline]
    pub const fn address(self) -> u16 {
        match self {
            Field::TravelLimit => 0,
            Field::DelayValue => 2,
            Field::StartOffset => 4,
        }
    }
}

/// Read a single field.
pub fn read_field<S: ConfigStore>(store: &mut S, field: Field) -> Result<u16> {
    let address = field.address();
    let low = store
        .read_byte(address)
        .map_err(|_| StorageError::Read { address })?;
    let high = store
        .read_byte(address + 1)
        .map_err(|_| StorageError::Read { address: address + 1 })?;
    Ok(u16::from_le_bytes([low, high]))
}

/// Write a single field, low byte first.
pub fn write_field<S: ConfigStore>(store: &mut S, field: Field, value: u16) -> Result<()> {
    let address = field.address();
    let [low, high] = value.to_le_bytes();
    store
        .write_byte(address, low)
        .map_err(|_| StorageError::Write { address })?;
    store
        .write_byte(address + 1, high)
        .map_err(|_| StorageError::Write { address: address + 1 })?;
    debug!("persisted {} = {}", field, value);
    Ok(())
}

/// The full persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedConfig {
    /// Full steps travelled before reversing.
    pub travel_limit: u16,
    /// Timer ticks per full step (not divided by microsteps).
    pub delay_value: u16,
    /// Full steps from rest to the zero position.
    pub start_offset: u16,
}

impl PersistedConfig {
    /// Load all fields.
    ///
    /// Values are taken as stored. Erased fields are reported but not
    /// replaced.
    pub fn load<S: ConfigStore>(store: &mut S) -> Result<Self> {
        let config = Self {
            travel_limit: read_field(store, Field::TravelLimit)?,
            delay_value: read_field(store, Field::DelayValue)?,
            start_offset: read_field(store, Field::StartOffset)?,
        };

        for field in Field::ALL {
            if config.get(field) == ERASED_FIELD {
                warn!("persisted {} reads as erased", field);
            }
        }

        info!(
            "loaded travel_limit={} delay_value={} start_offset={}",
            config.travel_limit,
            config.delay_value,
            config.start_offset
        );
        Ok(config)
    }

    /// Write all fields.
    pub fn store<S: ConfigStore>(&self, store: &mut S) -> Result<()> {
        for field in Field::ALL {
            write_field(store, field, self.get(field))?;
        }
        Ok(())
    }

    /// Get a field value.
    #[inline]
    pub fn get(&self, field: Field) -> u16 {
        match field {
            Field::TravelLimit => self.travel_limit,
            Field::DelayValue => self.delay_value,
            Field::StartOffset => self.start_offset,
        }
    }

    /// Check whether every field still reads as erased storage.
    pub fn is_erased(&self) -> bool {
        Field::ALL.iter().all(|&f| self.get(f) == ERASED_FIELD)
    }
}
