//! Register access over the bus
//!
//! Every read and write the driver issues goes through a
//! [`RegisterTransport`]. Failures are returned to the caller as
//! [`Error::I2CError`] and are never retried here.

use crate::{Error, Result};

/// Byte-addressed register access to the touch controller
pub trait RegisterTransport {
    /// Read a single register
    fn read_byte(&mut self, reg: u8) -> Result<u8>;

    /// Read `buf.len()` consecutive registers starting at `reg`
    fn read_block(&mut self, reg: u8, buf: &mut [u8]) -> Result<()>;

    /// Write a single register
    fn write_byte(&mut self, reg: u8, value: u8) -> Result<()>;
}

/// [`RegisterTransport`] over an `embedded-hal` blocking I2C bus
pub struct I2cTransport<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C> I2cTransport<I2C> {
    /// Wrap `i2c`, addressing the controller at 7-bit address `addr`
    pub fn new(i2c: I2C, addr: u8) -> Self {
        I2cTransport { i2c, addr }
    }

    /// Device address used for every transaction
    pub fn addr(&self) -> u8 {
        self.addr
    }

    /// Give back the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> RegisterTransport for I2cTransport<I2C>
where
    I2C: embedded_hal::blocking::i2c::Write + embedded_hal::blocking::i2c::WriteRead,
{
    fn read_byte(&mut self, reg: u8) -> Result<u8> {
        let mut rd_buf = [0u8; 1];
        self.read_block(reg, &mut rd_buf)?;
        Ok(rd_buf[0])
    }

    fn read_block(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
        self.i2c.write_read(self.addr, &[reg], buf).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::error!("read of register 0x{:02x} failed", reg);
            Error::I2CError
        })
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<()> {
        self.i2c.write(self.addr, &[reg, value]).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::error!("write of register 0x{:02x} failed", reg);
            Error::I2CError
        })
    }
}
