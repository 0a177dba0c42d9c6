//! `AM2315` Humidity and Temperature Sensor Driver
//!
//! The sensor speaks a Modbus-like register protocol over I2C. It sleeps
//! between requests and NACKs the first write that wakes it, so requests
//! are retried a few times. Every answer carries a CRC-16 (Modbus
//! polynomial, low byte first).
//!
//! ```text
//! read request   [0x03, reg, len]
//! read answer    [0x03, len, data.., crc_lo, crc_hi]
//! write request  [0x10, reg, len, data.., crc_lo, crc_hi]
//! write answer   [0x10, reg, len, crc_lo, crc_hi]
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::capability::{HumiditySensor, TemperatureSensor};
use crate::config::{AM2315_RESPONSE_DELAY_MS, AM2315_WAKE_RETRIES, AM2315_WAKE_RETRY_US};
use crate::error::{Error, Result};
use crate::hal::i2c::{I2cAddress, I2cBus};

/// Function codes and register addresses
mod reg {
    pub const FN_READ: u8 = 0x03;
    pub const FN_WRITE: u8 = 0x10;

    pub const HUMIDITY: u8 = 0x00;
    pub const MODEL: u8 = 0x08;
    pub const VERSION: u8 = 0x0A;
    pub const ID: u8 = 0x0B;
    pub const USER_A: u8 = 0x10;
    pub const USER_B: u8 = 0x12;
}

/// Longest register block in one request
const MAX_DATA: usize = 10;

/// CRC-16/Modbus (poly 0xA001 reflected, init 0xFFFF)
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Identification read at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Am2315Info {
    /// Model number
    pub model: u16,
    /// Firmware version
    pub version: u8,
    /// Device ID
    pub id: u32,
}

/// One humidity/temperature measurement
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Am2315Reading {
    /// Relative humidity in percent
    pub humidity: f32,
    /// Temperature in °C
    pub temperature_c: f32,
}

/// User-writable registers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UserRegister {
    /// User register A
    A,
    /// User register B
    B,
}

impl UserRegister {
    const fn as_reg(self) -> u8 {
        match self {
            Self::A => reg::USER_A,
            Self::B => reg::USER_B,
        }
    }
}

/// AM2315 driver
pub struct Am2315<I2C, D> {
    bus: I2cBus<I2C>,
    delay: D,
    info: Am2315Info,
}

impl<I2C: I2c, D: DelayNs> Am2315<I2C, D> {
    /// Connect at the fixed address and read the identification registers.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if the sensor does not answer, [`Error::Checksum`] or
    /// [`Error::Protocol`] on a corrupt answer.
    pub fn new(i2c: I2C, delay: D) -> Result<Self> {
        let mut dev = Self {
            bus: I2cBus::new(i2c, I2cAddress::AM2315),
            delay,
            info: Am2315Info::default(),
        };

        let mut model = [0u8; 2];
        dev.read_registers(reg::MODEL, &mut model)?;
        let mut version = [0u8; 1];
        dev.read_registers(reg::VERSION, &mut version)?;
        let mut id = [0u8; 4];
        dev.read_registers(reg::ID, &mut id)?;

        dev.info = Am2315Info {
            model: u16::from_be_bytes(model),
            version: version[0],
            id: u32::from_be_bytes(id),
        };
        debug!(
            "am2315 model {} version {} id {:#x}",
            dev.info.model,
            dev.info.version,
            dev.info.id
        );
        Ok(dev)
    }

    /// Identification read at construction
    #[must_use]
    pub const fn info(&self) -> Am2315Info {
        self.info
    }

    /// Measure humidity and temperature in one request
    ///
    /// # Errors
    ///
    /// Same as [`Am2315::new`].
    pub fn read(&mut self) -> Result<Am2315Reading> {
        let mut data = [0u8; 4];
        self.read_registers(reg::HUMIDITY, &mut data)?;

        let humidity = f32::from(u16::from_be_bytes([data[0], data[1]])) / 10.0;
        let raw_temp = u16::from_be_bytes([data[2], data[3]]);
        // Sign-magnitude: bit 15 is the sign
        let magnitude = f32::from(raw_temp & 0x7FFF) / 10.0;
        let temperature_c = if raw_temp & 0x8000 != 0 { -magnitude } else { magnitude };

        Ok(Am2315Reading {
            humidity,
            temperature_c,
        })
    }

    /// Relative humidity in percent
    ///
    /// # Errors
    ///
    /// Same as [`Am2315::read`].
    pub fn humidity(&mut self) -> Result<f32> {
        Ok(self.read()?.humidity)
    }

    /// Temperature in °C
    ///
    /// # Errors
    ///
    /// Same as [`Am2315::read`].
    pub fn temperature(&mut self) -> Result<f32> {
        Ok(self.read()?.temperature_c)
    }

    /// Read a 16-bit user register
    ///
    /// # Errors
    ///
    /// Same as [`Am2315::read`].
    pub fn read_user_register(&mut self, register: UserRegister) -> Result<u16> {
        let mut data = [0u8; 2];
        self.read_registers(register.as_reg(), &mut data)?;
        Ok(u16::from_be_bytes(data))
    }

    /// Write a 16-bit user register
    ///
    /// # Errors
    ///
    /// Same as [`Am2315::read`].
    pub fn write_user_register(&mut self, register: UserRegister, value: u16) -> Result<()> {
        self.write_registers(register.as_reg(), &value.to_be_bytes())
    }

    /// Give the bus and delay back
    pub fn release(self) -> (I2C, D) {
        (self.bus.release(), self.delay)
    }

    /// Send a request, retrying while the sensor wakes up.
    fn request(&mut self, frame: &[u8]) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.bus.write(frame) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < AM2315_WAKE_RETRIES => {
                    trace!("am2315 wake attempt {} failed: {}", attempt, e);
                    attempt += 1;
                    self.delay.delay_us(AM2315_WAKE_RETRY_US);
                }
                Err(e) => {
                    warn!("am2315 did not wake: {}", e);
                    return Err(e);
                }
            }
        }
    }

    fn read_registers(&mut self, start: u8, out: &mut [u8]) -> Result<()> {
        let len = out.len();
        if len == 0 || len > MAX_DATA {
            return Err(Error::InvalidArgument("register block length"));
        }

        self.request(&[reg::FN_READ, start, len as u8])?;
        self.delay.delay_ms(AM2315_RESPONSE_DELAY_MS);

        let mut answer = [0u8; MAX_DATA + 4];
        let answer = &mut answer[..len + 4];
        self.bus.read(answer)?;

        if answer[0] != reg::FN_READ || usize::from(answer[1]) != len {
            warn!("am2315 unexpected header {} {}", answer[0], answer[1]);
            return Err(Error::Protocol);
        }
        check_crc(&answer[..len + 2], answer[len + 2], answer[len + 3])?;

        out.copy_from_slice(&answer[2..len + 2]);
        Ok(())
    }

    fn write_registers(&mut self, start: u8, data: &[u8]) -> Result<()> {
        let len = data.len();
        if len == 0 || len > MAX_DATA {
            return Err(Error::InvalidArgument("register block length"));
        }

        let mut frame = [0u8; MAX_DATA + 5];
        frame[0] = reg::FN_WRITE;
        frame[1] = start;
        frame[2] = len as u8;
        frame[3..3 + len].copy_from_slice(data);
        let [crc_lo, crc_hi] = crc16(&frame[..3 + len]).to_le_bytes();
        frame[3 + len] = crc_lo;
        frame[4 + len] = crc_hi;

        self.request(&frame[..5 + len])?;
        self.delay.delay_ms(AM2315_RESPONSE_DELAY_MS);

        let mut ack = [0u8; 5];
        self.bus.read(&mut ack)?;
        if ack[0] != reg::FN_WRITE || ack[1] != start || usize::from(ack[2]) != len {
            warn!("am2315 unexpected write ack");
            return Err(Error::Protocol);
        }
        check_crc(&ack[..3], ack[3], ack[4])
    }
}

fn check_crc(payload: &[u8], lo: u8, hi: u8) -> Result<()> {
    let expected = crc16(payload);
    let actual = u16::from_le_bytes([lo, hi]);
    if expected == actual {
        Ok(())
    } else {
        warn!("am2315 crc mismatch {:#x} != {:#x}", expected, actual);
        Err(Error::Checksum { expected, actual })
    }
}

impl<I2C: I2c, D: DelayNs> TemperatureSensor for Am2315<I2C, D> {
    fn temperature_celsius(&mut self) -> Result<f32> {
        self.temperature()
    }
}

impl<I2C: I2c, D: DelayNs> HumiditySensor for Am2315<I2C, D> {
    fn relative_humidity(&mut self) -> Result<f32> {
        self.humidity()
    }
}

#[cfg(test)]
mod tests {
    use super::crc16;

    #[test]
    fn crc16_check_value() {
        // CRC-16/MODBUS check value
        assert_eq!(crc16(b"123456789"), 0x4B37);
    }

    #[test]
    fn crc16_of_nothing_is_init() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }
}
