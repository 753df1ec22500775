//! Contact block decoding
//!
//! Each contact occupies a small block of registers:
//!
//! | byte | bits 7:4            | bits 3:0   |
//! |------|---------------------|------------|
//! | 0    | event flags         | X\[11:8\]  |
//! | 1    | X\[7:0\]            |            |
//! | 2    | touch id            | Y\[11:8\]  |
//! | 3    | Y\[7:0\]            |            |
//! | 4    | weight (extended)   |            |
//! | 5    | misc (extended)     | area       |
//!
//! Position decoding only looks at the low nibbles. The flag nibbles are
//! exposed separately through [`ContactFlags`].

use crate::{Error, Result};

/// Largest block any layout reads
pub const MAX_BLOCK_LEN: usize = 6;

/// Number of registers read per contact
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockLayout {
    /// XH, XL, YH, YL
    Compact,
    /// XH, XL, YH, YL, WEIGHT, MISC
    Extended,
}

impl BlockLayout {
    pub const fn len(self) -> usize {
        match self {
            BlockLayout::Compact => 4,
            BlockLayout::Extended => 6,
        }
    }
}

/// Decoded position of one contact
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    /// X position, 12 bits
    pub x: u16,
    /// Y position, 12 bits
    pub y: u16,
    /// Contents of the WEIGHT register, extended layout only
    pub weight: Option<u8>,
    /// Touch area from the MISC register, extended layout only
    pub area: Option<u8>,
}

impl TouchPoint {
    /// Decode the position from a 4-byte block
    pub fn decode(raw: &[u8; 4]) -> TouchPoint {
        TouchPoint {
            x: coordinate(raw[0], raw[1]),
            y: coordinate(raw[2], raw[3]),
            weight: None,
            area: None,
        }
    }
}

fn coordinate(high: u8, low: u8) -> u16 {
    (u16::from(high & 0x0F) << 8) | u16::from(low)
}

/// One contact's registers, as read from the device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawContactBlock {
    bytes: [u8; MAX_BLOCK_LEN],
    layout: BlockLayout,
}

impl RawContactBlock {
    /// Wrap a block read from the device
    ///
    /// Returns `Err(Error::ProtocolError)` unless `bytes` matches one of the
    /// [`BlockLayout`] lengths.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let layout = match bytes.len() {
            4 => BlockLayout::Compact,
            6 => BlockLayout::Extended,
            _ => return Err(Error::ProtocolError),
        };
        let mut block = [0u8; MAX_BLOCK_LEN];
        block[..bytes.len()].copy_from_slice(bytes);
        Ok(RawContactBlock {
            bytes: block,
            layout,
        })
    }

    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.layout.len()]
    }

    /// Decode position, plus weight and area for extended blocks
    pub fn decode(&self) -> TouchPoint {
        let b = &self.bytes;
        let point = TouchPoint::decode(&[b[0], b[1], b[2], b[3]]);
        match self.layout {
            BlockLayout::Compact => point,
            BlockLayout::Extended => TouchPoint {
                weight: Some(b[4]),
                area: Some(b[5] & 0x0F),
                ..point
            },
        }
    }

    /// Flag bits the position decode ignores
    pub fn flags(&self) -> ContactFlags {
        ContactFlags {
            event: EventFlag::from_register(self.bytes[0]),
            touch_id: self.bytes[2] >> 4,
        }
    }
}

/// Event reported in the top bits of a contact's XH register
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventFlag {
    PressDown,
    LiftUp,
    Contact,
    NoEvent,
}

impl EventFlag {
    /// Event from bits 7:6 of the XH register
    pub fn from_register(reg: u8) -> Self {
        match reg >> 6 {
            0 => EventFlag::PressDown,
            1 => EventFlag::LiftUp,
            2 => EventFlag::Contact,
            _ => EventFlag::NoEvent,
        }
    }
}

/// Non-positional contents of a contact block
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContactFlags {
    pub event: EventFlag,
    /// Controller-assigned touch id, 0x0F when invalid
    pub touch_id: u8,
}
