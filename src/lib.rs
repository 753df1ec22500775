//! FT5316 capacitive touchscreen controller device driver
//!
//! This crate turns the FT5316's touch registers into a multi-touch event
//! stream: per report, one [`SlotUpdate`] for every slot that changed
//! followed by a single frame-sync.
//!
//! The FT5316 connects to the target via I2C and an interrupt line. The
//! [`embedded_hal`](https://docs.rs/embedded-hal) `blocking::i2c` and
//! `digital::v2` interfaces are used, so should work with any target that
//! provides these.
//!
//! Events are delivered to a [`MultiTouchSink`] owned by the driver:
//!
//! ```rust,ignore
//!     struct Screen;
//!
//!     impl ft5316::MultiTouchSink for Screen {
//!         fn report(&mut self, update: ft5316::SlotUpdate) {
//!             info!("slot {}: {},{} {}", update.slot, update.x, update.y, update.active);
//!         }
//!
//!         fn sync(&mut self) {}
//!     }
//!
//!     let int_pin = pins.gpio3.into_pull_up_input();
//!     let mut touch = ft5316::Ft5316::new(
//!         i2c,
//!         ft5316::DEFAULT_I2C_ADDR,
//!         int_pin,
//!         Screen,
//!         ft5316::Config::default().resolution(800, 480),
//!     );
//!     touch.init()?;
//! ```
//!
//! Each assertion of the interrupt line should then be serviced with a call
//! to `touch.service_interrupt()`, from the interrupt handler or a task it
//! wakes. The cycle runs to completion and may block on the bus, so the
//! interrupt should be re-armed with `clear_irq()` only once it returns.
//! Targets without interrupts can poll `touch.try_service()` instead, which
//! only touches the bus while the line is asserted.

#![cfg_attr(not(test), no_std)]

use paste;

pub mod config;
pub mod cycle;
pub mod point;
pub mod registers;
pub mod slots;
pub mod status;
pub mod transport;

pub use config::{Config, InterruptMode, Trigger};
pub use cycle::{CycleState, InterruptCycle};
pub use point::{BlockLayout, ContactFlags, EventFlag, RawContactBlock, TouchPoint};
pub use slots::{FrameSummary, MultiTouchSink, Slot, SlotTracker, SlotUpdate, MAX_TOUCH_POINTS};
pub use status::TouchStatus;
pub use transport::{I2cTransport, RegisterTransport};

/// Errors produced by the FT5316 device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An error accessing the interrupt GPIO pin
    GPIOError,
    /// An error accessing the I2C interface
    I2CError,
    /// Register data or layout does not match the device
    ProtocolError,
}

pub type Result<T> = core::result::Result<T, Error>;

/// Default I2C device address for FT5316 devices
pub const DEFAULT_I2C_ADDR: u8 = 0x38;

/// Identification registers of the FT5316 device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    /// Contents of the Chip ID register
    pub chip_id: u8,
    /// Contents of the Firmware ID register
    pub firmware_id: u8,
    /// Contents of the Vendor ID register
    pub vendor_id: u8,
}

/// FT5316 driver
pub struct Ft5316<T, INT, S> {
    transport: T,
    int_pin: INT,
    sink: S,
    cycle: InterruptCycle,
}

impl<I2C, INT, S> Ft5316<I2cTransport<I2C>, INT, S> {
    /// Create a new FT5316 device on an I2C bus
    ///
    /// `i2c` is the I2C device
    /// `int_pin` is the controller's interrupt output, as an input GPIO
    /// `sink` receives the touch events
    pub fn new(i2c: I2C, addr: u8, int_pin: INT, sink: S, config: Config) -> Self {
        Self::with_transport(I2cTransport::new(i2c, addr), int_pin, sink, config)
    }
}

impl<T, INT, S> Ft5316<T, INT, S> {
    /// Create a new FT5316 device on any register transport
    pub fn with_transport(transport: T, int_pin: INT, sink: S, config: Config) -> Self {
        Ft5316 {
            transport,
            int_pin,
            sink,
            cycle: InterruptCycle::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        self.cycle.config()
    }

    pub fn cycle_state(&self) -> CycleState {
        self.cycle.state()
    }

    pub fn slots(&self) -> &[Slot] {
        self.cycle.tracker().slots()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Call platform specific function to clear interrupt on the interrupt pin
    ///
    /// This wrapper is needed as the driver owns the pin, so the platform
    /// can't maintain a mutable reference to it
    pub fn clear_irq<F: FnMut(&mut INT)>(&mut self, mut f: F) {
        f(&mut self.int_pin)
    }

    /// Tear down the driver, returning the transport, pin and sink
    pub fn release(self) -> (T, INT, S) {
        (self.transport, self.int_pin, self.sink)
    }
}

impl<T, INT, S> Ft5316<T, INT, S>
where
    T: RegisterTransport,
    S: MultiTouchSink,
{
    /// Initialize the FT5316 device
    ///
    /// Empties every slot, puts the device in working mode with the
    /// configured interrupt mode, and announces the panel to the sink.
    pub fn init(&mut self) -> Result<()> {
        let config = *self.cycle.config();
        config.validate()?;
        self.cycle.reset();
        self.transport
            .write_byte(registers::DEVICE_MODE, registers::DEVICE_MODE_WORKING)?;
        self.transport
            .write_byte(registers::G_MODE, config.interrupt_mode as u8)?;
        self.sink
            .configure(config.x_max, config.y_max, self.cycle.tracker().capacity());
        Ok(())
    }

    /// Read the device identification registers
    pub fn get_info(&mut self) -> Result<DeviceInfo> {
        let info = DeviceInfo {
            chip_id: self.transport.read_byte(registers::CHIP_ID)?,
            firmware_id: self.transport.read_byte(registers::FIRMWARE_ID)?,
            vendor_id: self.transport.read_byte(registers::VENDOR_ID)?,
        };
        #[cfg(feature = "defmt")]
        defmt::info!(
            "FT5316: chip {:02x}, firmware {:02x}, vendor {:02x}",
            info.chip_id,
            info.firmware_id,
            info.vendor_id
        );
        Ok(info)
    }

    /// Run one report cycle
    ///
    /// Returns `Ok(None)` when the device had nothing to report, or the
    /// summary of the frame delivered to the sink. An `Err` means the cycle
    /// was abandoned without emitting anything; the device remains usable.
    pub fn service_interrupt(&mut self) -> Result<Option<FrameSummary>> {
        self.cycle.run(&mut self.transport, &mut self.sink)
    }
}

impl<T, INT, S> Ft5316<T, INT, S>
where
    INT: embedded_hal::digital::v2::InputPin,
{
    /// Test if the interrupt line is asserted
    ///
    /// Return `true` if a report is pending
    pub fn is_pending(&mut self) -> Result<bool> {
        let level = match self.cycle.config().trigger {
            Trigger::FallingEdge => self.int_pin.is_low(),
            Trigger::RisingEdge => self.int_pin.is_high(),
        };
        level.map_err(|_| Error::GPIOError)
    }
}

impl<T, INT, S> Ft5316<T, INT, S>
where
    T: RegisterTransport,
    INT: embedded_hal::digital::v2::InputPin,
    S: MultiTouchSink,
{
    /// Attempt a report cycle
    ///
    /// Returns immediately with `Ok(None)` if the interrupt line is not
    /// asserted, without touching the bus
    pub fn try_service(&mut self) -> Result<Option<FrameSummary>> {
        if self.is_pending()? {
            self.service_interrupt()
        } else {
            Ok(None)
        }
    }
}
