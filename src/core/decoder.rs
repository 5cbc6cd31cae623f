//! Heart Rate Measurement frame decoding.
//!
//! Frames follow the GATT Heart Rate Measurement characteristic layout:
//! a flags byte followed by the heart-rate value as either a `u8` or a
//! little-endian `u16`. Energy expended and RR-intervals may follow, but they
//! are never read here, so a frame that advertises them without carrying them
//! still decodes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the heart-rate value, selected by bit 0 of the flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    U8,
    U16,
}

impl ValueFormat {
    /// Minimum frame length needed to read a value of this width.
    pub fn required_len(self) -> usize {
        match self {
            ValueFormat::U8 => 2,
            ValueFormat::U16 => 3,
        }
    }
}

/// The packed flags byte at offset 0.
///
/// Bits are numbered from the least significant:
///
/// | bit | meaning                   |
/// |-----|---------------------------|
/// | 0   | value format (0 = u8)     |
/// | 1   | sensor contact detected   |
/// | 2   | sensor contact supported  |
/// | 3   | energy expended present   |
/// | 4   | RR-interval present       |
/// | 5-7 | reserved                  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags(u8);

impl Flags {
    const VALUE_FORMAT: u8 = 1 << 0;
    const CONTACT_DETECTED: u8 = 1 << 1;
    const CONTACT_SUPPORTED: u8 = 1 << 2;
    const ENERGY_EXPENDED: u8 = 1 << 3;
    const RR_INTERVAL: u8 = 1 << 4;
    const RESERVED_SHIFT: u8 = 5;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn value_format(self) -> ValueFormat {
        if self.0 & Self::VALUE_FORMAT != 0 {
            ValueFormat::U16
        } else {
            ValueFormat::U8
        }
    }

    pub fn sensor_contact_detected(self) -> bool {
        self.0 & Self::CONTACT_DETECTED != 0
    }

    pub fn sensor_contact_supported(self) -> bool {
        self.0 & Self::CONTACT_SUPPORTED != 0
    }

    pub fn energy_expended_present(self) -> bool {
        self.0 & Self::ENERGY_EXPENDED != 0
    }

    pub fn rr_interval_present(self) -> bool {
        self.0 & Self::RR_INTERVAL != 0
    }

    /// The three reserved high bits, shifted down.
    pub fn reserved(self) -> u8 {
        self.0 >> Self::RESERVED_SHIFT
    }

    /// Skin contact state, or `None` if the sensor cannot report it.
    pub fn contact(self) -> Option<bool> {
        self.sensor_contact_supported()
            .then_some(self.sensor_contact_detected())
    }
}

/// A decoded heart-rate reading.
///
/// A value of 0 means the sensor has no signal (strap off, no contact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub value: u16,
    pub flags: Flags,
}

impl Reading {
    pub fn new(value: u16, flags: Flags) -> Self {
        Self { value, flags }
    }

    /// Whether the reading carries a heart rate rather than the no-signal sentinel.
    pub fn has_signal(&self) -> bool {
        self.value > 0
    }
}

/// Errors produced while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    FrameTooShort { needed: usize, actual: usize },
}

/// Decode a raw notification frame into a [`Reading`].
pub fn decode(frame: &[u8]) -> Result<Reading, DecodeError> {
    let Some(&first) = frame.first() else {
        return Err(DecodeError::FrameTooShort {
            needed: ValueFormat::U8.required_len(),
            actual: 0,
        });
    };

    let flags = Flags::from_bits(first);
    let format = flags.value_format();
    let needed = format.required_len();
    if frame.len() < needed {
        return Err(DecodeError::FrameTooShort {
            needed,
            actual: frame.len(),
        });
    }

    let value = match format {
        ValueFormat::U8 => u16::from(frame[1]),
        ValueFormat::U16 => u16::from_le_bytes([frame[1], frame[2]]),
    };

    Ok(Reading::new(value, flags))
}
