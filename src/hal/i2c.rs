//! I2C Bus Abstractions
//!
//! Register-level access to one device on a blocking `embedded-hal` I2C
//! bus. Bus errors are folded into [`Error::I2c`].

use embedded_hal::i2c::I2c;
use heapless::Vec;

use crate::error::{Error, Result};

/// I2C device address wrapper
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// `AM2315` humidity/temperature sensor
    pub const AM2315: Self = Self(crate::config::AM2315_I2C_ADDR);

    /// `ADC121C021` 12-bit converter
    pub const ADC121C021: Self = Self(crate::config::ADC121C021_I2C_ADDR);

    /// Create from 7-bit address
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self(addr & 0x7F)
    }

    /// Get the 7-bit address
    #[must_use]
    pub const fn addr(self) -> u8 {
        self.0
    }
}

/// Largest register block written in one transaction
const MAX_BLOCK: usize = 16;

/// One device on an I2C bus
pub struct I2cBus<I2C> {
    i2c: I2C,
    address: I2cAddress,
}

impl<I2C: I2c> I2cBus<I2C> {
    /// Bind a bus to a device address
    #[must_use]
    pub fn new(i2c: I2C, address: I2cAddress) -> Self {
        Self { i2c, address }
    }

    /// Device address
    #[must_use]
    pub const fn address(&self) -> I2cAddress {
        self.address
    }

    /// Write bytes to the device
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.i2c.write(self.address.addr(), data).map_err(Error::i2c)
    }

    /// Read bytes from the device
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.i2c.read(self.address.addr(), buffer).map_err(Error::i2c)
    }

    /// Write then read (combined transaction)
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn write_read(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        self.i2c
            .write_read(self.address.addr(), write, read)
            .map_err(Error::i2c)
    }

    /// Write a single register
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.write(&[reg, value])
    }

    /// Read a single register
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn read_reg(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [0u8];
        self.write_read(&[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian 16-bit register
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn read_reg_u16_be(&mut self, reg: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.write_read(&[reg], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Write a big-endian 16-bit register
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn write_reg_u16_be(&mut self, reg: u8, value: u16) -> Result<()> {
        let [hi, lo] = value.to_be_bytes();
        self.write(&[reg, hi, lo])
    }

    /// Update selected bits of a register (read-modify-write)
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn update_reg(&mut self, reg: u8, mask: u8, bits: u8) -> Result<u8> {
        let value = (self.read_reg(reg)? & !mask) | (bits & mask);
        self.write_reg(reg, value)?;
        Ok(value)
    }

    /// Write multiple registers starting at base address
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn write_regs(&mut self, base_reg: u8, values: &[u8]) -> Result<()> {
        if values.len() <= MAX_BLOCK {
            let mut buf = [0u8; MAX_BLOCK + 1];
            buf[0] = base_reg;
            buf[1..=values.len()].copy_from_slice(values);
            self.write(&buf[..=values.len()])
        } else {
            // Larger blocks go register by register
            for (i, &value) in values.iter().enumerate() {
                self.write_reg(base_reg.wrapping_add(i as u8), value)?;
            }
            Ok(())
        }
    }

    /// Read multiple registers starting at base address
    ///
    /// # Errors
    ///
    /// Returns [`Error::I2c`] on a bus failure.
    pub fn read_regs(&mut self, base_reg: u8, buffer: &mut [u8]) -> Result<()> {
        self.write_read(&[base_reg], buffer)
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// Scan the bus for responding devices
pub fn scan<I2C: I2c>(i2c: &mut I2C) -> Vec<I2cAddress, 16> {
    let mut devices = Vec::new();

    for addr in 0x08..0x78 {
        let mut buf = [0u8; 1];
        if i2c.read(addr, &mut buf).is_ok() && devices.push(I2cAddress::new(addr)).is_err() {
            break;
        }
    }

    devices
}
