//! Initialization parameters

use crate::point::BlockLayout;
use crate::registers;
use crate::slots::MAX_TOUCH_POINTS;
use crate::{Error, Result};

/// Edge of the interrupt line that signals a new report
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Line is pulled low while a report is pending
    FallingEdge,
    /// Line is driven high while a report is pending
    RisingEdge,
}

/// How the controller drives its interrupt line, written to `G_MODE`
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Line stays asserted while a touch is held
    Polling = 0x00,
    /// Line pulses once per report
    Trigger = 0x01,
}

/// Driver configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Panel width advertised to the sink
    pub x_max: u16,
    /// Panel height advertised to the sink
    pub y_max: u16,
    /// Number of contacts read per report, at most [`MAX_TOUCH_POINTS`]
    pub max_contacts: u8,
    /// Register holding contact 0's block
    pub first_contact_register: u8,
    /// Register distance between successive contacts
    pub contact_stride: u8,
    /// Bytes read per contact
    pub layout: BlockLayout,
    /// Interrupt line polarity
    pub trigger: Trigger,
    /// Interrupt mode programmed at init
    pub interrupt_mode: InterruptMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            x_max: 800,
            y_max: 480,
            max_contacts: MAX_TOUCH_POINTS as u8,
            first_contact_register: registers::TOUCH_XH,
            contact_stride: registers::CONTACT_STRIDE,
            layout: BlockLayout::Compact,
            trigger: Trigger::FallingEdge,
            interrupt_mode: InterruptMode::Trigger,
        }
    }
}

impl Config {
    pub fn resolution(mut self, x_max: u16, y_max: u16) -> Self {
        self.x_max = x_max;
        self.y_max = y_max;
        self
    }

    /// Contacts above [`MAX_TOUCH_POINTS`] are clamped
    pub fn max_contacts(mut self, n: u8) -> Self {
        self.max_contacts = n.min(MAX_TOUCH_POINTS as u8);
        self
    }

    pub fn contact_table(mut self, first_register: u8, stride: u8) -> Self {
        self.first_contact_register = first_register;
        self.contact_stride = stride;
        self
    }

    pub fn layout(mut self, layout: BlockLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn interrupt_mode(mut self, mode: InterruptMode) -> Self {
        self.interrupt_mode = mode;
        self
    }

    /// Register holding the block of contact `index`
    ///
    /// Returns `Err(Error::ProtocolError)` if the block would not fit in the
    /// 8-bit register space.
    pub fn contact_register(&self, index: u8) -> Result<u8> {
        let base = self.first_contact_register as usize
            + index as usize * self.contact_stride as usize;
        if base + self.layout.len() > 0x100 {
            return Err(Error::ProtocolError);
        }
        Ok(base as u8)
    }

    /// Check that the contact table is consistent with the block layout
    pub fn validate(&self) -> Result<()> {
        if (self.contact_stride as usize) < self.layout.len() {
            return Err(Error::ProtocolError);
        }
        if self.max_contacts as usize > MAX_TOUCH_POINTS {
            return Err(Error::ProtocolError);
        }
        if self.max_contacts > 0 {
            self.contact_register(self.max_contacts - 1)?;
        }
        Ok(())
    }
}
