//! Touch status register

use crate::registers;
use crate::transport::RegisterTransport;
use crate::Result;

/// Contents of the touch status register
///
/// Bit `i` is set while contact `i` has data to report.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchStatus(pub u8);

impl TouchStatus {
    /// Read the status register once
    pub fn read<T: RegisterTransport>(transport: &mut T) -> Result<TouchStatus> {
        transport.read_byte(registers::TOUCH_STATUS).map(TouchStatus)
    }

    /// `true` when the device has nothing to report this cycle
    pub fn is_idle(self) -> bool {
        self.0 == 0
    }

    /// Number of contacts flagged
    pub fn contact_count(self) -> u8 {
        self.0.count_ones() as u8
    }

    pub fn has_contact(self, index: u8) -> bool {
        index < 8 && self.0 & (1 << index) != 0
    }

    /// Contacts flagged at or above `capacity`
    pub fn overflow(self, capacity: u8) -> u8 {
        if capacity >= 8 {
            0
        } else {
            (self.0 >> capacity).count_ones() as u8
        }
    }
}
