//! `MAX31855` Thermocouple Converter Driver
//!
//! Read-only SPI device: every transaction clocks out one 32-bit frame.
//!
//! ```text
//! D31..D18  thermocouple temperature, signed, 0.25 °C/LSB
//! D16       fault (any of D2..D0)
//! D15..D4   cold-junction temperature, signed, 0.0625 °C/LSB
//! D2        short to VCC
//! D1        short to GND
//! D0        open circuit
//! ```

use embedded_hal::spi::SpiDevice;

use crate::capability::TemperatureSensor;
use crate::config::{MAX31855_CJ_LSB_C, MAX31855_TC_LSB_C};
use crate::error::{Error, Result, ThermocoupleFault};

/// One decoded frame
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermocoupleReading {
    /// Hot-junction temperature in °C
    pub thermocouple_c: f32,
    /// Cold-junction (die) temperature in °C
    pub internal_c: f32,
}

/// Decode a frame.
///
/// # Errors
///
/// [`Error::Thermocouple`] when any fault bit is set; the temperature
/// fields of a faulted frame are meaningless.
pub fn decode(frame: u32) -> Result<ThermocoupleReading> {
    let fault = ThermocoupleFault::from_bits((frame & 0x7) as u8);
    if fault.bits() != 0 {
        return Err(Error::Thermocouple(fault));
    }

    let thermocouple = (frame as i32) >> 18;
    let internal = ((frame as i32) << 16) >> 20;

    Ok(ThermocoupleReading {
        thermocouple_c: thermocouple as f32 * MAX31855_TC_LSB_C,
        internal_c: internal as f32 * MAX31855_CJ_LSB_C,
    })
}

/// MAX31855 driver
pub struct Max31855<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Max31855<SPI> {
    /// Wrap an SPI device (chip select handled by the device)
    #[must_use]
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Read the raw 32-bit frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] on a bus failure.
    pub fn read_frame(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.spi.read(&mut buf).map_err(Error::spi)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read and decode one frame
    ///
    /// # Errors
    ///
    /// [`Error::Spi`] on a bus failure, [`Error::Thermocouple`] on a
    /// reported fault.
    pub fn read(&mut self) -> Result<ThermocoupleReading> {
        let frame = self.read_frame()?;
        decode(frame).inspect_err(|e| warn!("max31855 frame {:#x}: {}", frame, e))
    }

    /// Hot-junction temperature in °C
    ///
    /// # Errors
    ///
    /// Same as [`Max31855::read`].
    pub fn temperature(&mut self) -> Result<f32> {
        Ok(self.read()?.thermocouple_c)
    }

    /// Cold-junction temperature in °C
    ///
    /// # Errors
    ///
    /// Same as [`Max31855::read`].
    pub fn internal_temperature(&mut self) -> Result<f32> {
        Ok(self.read()?.internal_c)
    }

    /// Give the SPI device back
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> TemperatureSensor for Max31855<SPI> {
    fn temperature_celsius(&mut self) -> Result<f32> {
        self.temperature()
    }
}
