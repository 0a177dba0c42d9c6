//! `ADC121C021` 12-bit I2C ADC Driver
//!
//! Single-channel converter with a window comparator. Results and limits
//! are 12-bit values in 16-bit big-endian registers; bit 15 of the result
//! register mirrors the alert flag.

use embedded_hal::i2c::I2c;

use crate::capability::VoltageSensor;
use crate::config::{ADC121C021_BITS, ADC121C021_DEFAULT_VREF};
use crate::error::Result;
use crate::hal::adc::{AdcReading, AnalogInput};
use crate::hal::i2c::{I2cAddress, I2cBus};

/// Register addresses and bit fields
mod reg {
    pub const RESULT: u8 = 0x00;
    pub const ALERT_STATUS: u8 = 0x01;
    pub const CONFIG: u8 = 0x02;
    pub const LIMIT_UNDER: u8 = 0x03;
    pub const LIMIT_OVER: u8 = 0x04;
    pub const HYSTERESIS: u8 = 0x05;
    pub const LOWEST: u8 = 0x06;
    pub const HIGHEST: u8 = 0x07;

    pub const RESULT_ALERT: u16 = 0x8000;
    pub const VALUE_MASK: u16 = 0x0FFF;

    pub const STATUS_UNDER: u8 = 0x01;
    pub const STATUS_OVER: u8 = 0x02;

    pub const CFG_POLARITY_HIGH: u8 = 0x01;
    pub const CFG_ALERT_PIN: u8 = 0x04;
    pub const CFG_ALERT_FLAG: u8 = 0x08;
    pub const CFG_ALERT_HOLD: u8 = 0x10;
    pub const CFG_CYCLE_MASK: u8 = 0xE0;
    pub const CFG_CYCLE_SHIFT: u8 = 5;
}

/// Automatic conversion interval, as a divider of the converter clock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleTime {
    /// Automatic conversion off
    #[default]
    Disabled,
    /// Tconvert x 32
    Div32,
    /// Tconvert x 64
    Div64,
    /// Tconvert x 128
    Div128,
    /// Tconvert x 256
    Div256,
    /// Tconvert x 512
    Div512,
    /// Tconvert x 1024
    Div1024,
    /// Tconvert x 2048
    Div2048,
}

impl CycleTime {
    const fn as_reg(self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::Div32 => 1,
            Self::Div64 => 2,
            Self::Div128 => 3,
            Self::Div256 => 4,
            Self::Div512 => 5,
            Self::Div1024 => 6,
            Self::Div2048 => 7,
        }
    }
}

/// Which limit triggered an alert
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertStatus {
    /// Result fell below the low limit
    pub low: bool,
    /// Result rose above the high limit
    pub high: bool,
}

/// ADC121C021 driver
pub struct Adc121c021<I2C> {
    bus: I2cBus<I2C>,
    vref: f32,
}

impl<I2C: I2c> Adc121c021<I2C> {
    /// Driver at the default address and reference
    #[must_use]
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, I2cAddress::ADC121C021, ADC121C021_DEFAULT_VREF)
    }

    /// Driver at an explicit address and reference voltage
    #[must_use]
    pub fn with_address(i2c: I2C, address: I2cAddress, vref: f32) -> Self {
        Self {
            bus: I2cBus::new(i2c, address),
            vref,
        }
    }

    /// Reference voltage
    #[must_use]
    pub const fn vref(&self) -> f32 {
        self.vref
    }

    /// Latest conversion (12-bit)
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn value(&mut self) -> Result<u16> {
        Ok(self.bus.read_reg_u16_be(reg::RESULT)? & reg::VALUE_MASK)
    }

    /// Convert a 12-bit value to volts, full scale (0xFFF) being `vref`
    #[must_use]
    pub fn value_to_volts(&self, value: u16) -> f32 {
        AdcReading::new(value & reg::VALUE_MASK, ADC121C021_BITS).volts(self.vref)
    }

    /// Latest conversion in volts
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn volts(&mut self) -> Result<f32> {
        let value = self.value()?;
        Ok(self.value_to_volts(value))
    }

    /// Alert flag carried in the result register
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn alert_flag(&mut self) -> Result<bool> {
        Ok(self.bus.read_reg_u16_be(reg::RESULT)? & reg::RESULT_ALERT != 0)
    }

    /// Read the alert status register
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn alert_status(&mut self) -> Result<AlertStatus> {
        let status = self.bus.read_reg(reg::ALERT_STATUS)?;
        Ok(AlertStatus {
            low: status & reg::STATUS_UNDER != 0,
            high: status & reg::STATUS_OVER != 0,
        })
    }

    /// Clear both alert status bits
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn clear_alert_status(&mut self) -> Result<()> {
        self.bus
            .write_reg(reg::ALERT_STATUS, reg::STATUS_UNDER | reg::STATUS_OVER)
    }

    /// Report alerts in bit 15 of the result register
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn enable_alert_flag(&mut self, enable: bool) -> Result<()> {
        self.set_config_bit(reg::CFG_ALERT_FLAG, enable)
    }

    /// Drive the ALERT pin on an alert
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn enable_alert_pin(&mut self, enable: bool) -> Result<()> {
        self.set_config_bit(reg::CFG_ALERT_PIN, enable)
    }

    /// Hold alerts until cleared instead of self-clearing
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn enable_alert_hold(&mut self, enable: bool) -> Result<()> {
        self.set_config_bit(reg::CFG_ALERT_HOLD, enable)
    }

    /// Make the ALERT pin active high
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn set_alert_pin_polarity_high(&mut self, high: bool) -> Result<()> {
        self.set_config_bit(reg::CFG_POLARITY_HIGH, high)
    }

    /// Set the automatic conversion interval
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn set_automatic_conversion(&mut self, cycle: CycleTime) -> Result<()> {
        self.bus
            .update_reg(reg::CONFIG, reg::CFG_CYCLE_MASK, cycle.as_reg() << reg::CFG_CYCLE_SHIFT)
            .map(|_| ())
    }

    /// Alert when the result falls below `limit`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn set_alert_low_limit(&mut self, limit: u16) -> Result<()> {
        self.bus
            .write_reg_u16_be(reg::LIMIT_UNDER, limit & reg::VALUE_MASK)
    }

    /// Alert when the result rises above `limit`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn set_alert_high_limit(&mut self, limit: u16) -> Result<()> {
        self.bus
            .write_reg_u16_be(reg::LIMIT_OVER, limit & reg::VALUE_MASK)
    }

    /// Set the comparator hysteresis
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn set_hysteresis(&mut self, hysteresis: u16) -> Result<()> {
        self.bus
            .write_reg_u16_be(reg::HYSTERESIS, hysteresis & reg::VALUE_MASK)
    }

    /// Highest conversion since the last clear
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn highest_conversion(&mut self) -> Result<u16> {
        Ok(self.bus.read_reg_u16_be(reg::HIGHEST)? & reg::VALUE_MASK)
    }

    /// Lowest conversion since the last clear
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn lowest_conversion(&mut self) -> Result<u16> {
        Ok(self.bus.read_reg_u16_be(reg::LOWEST)? & reg::VALUE_MASK)
    }

    /// Reset the highest-conversion tracker
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn clear_highest_conversion(&mut self) -> Result<()> {
        self.bus.write_reg_u16_be(reg::HIGHEST, 0x0000)
    }

    /// Reset the lowest-conversion tracker
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::I2c`] on a bus failure.
    pub fn clear_lowest_conversion(&mut self) -> Result<()> {
        self.bus.write_reg_u16_be(reg::LOWEST, reg::VALUE_MASK)
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.bus.release()
    }

    fn set_config_bit(&mut self, bit: u8, enable: bool) -> Result<()> {
        let bits = if enable { bit } else { 0 };
        self.bus.update_reg(reg::CONFIG, bit, bits).map(|_| ())
    }
}

impl<I2C: I2c> AnalogInput for Adc121c021<I2C> {
    fn resolution_bits(&self) -> u8 {
        ADC121C021_BITS
    }

    fn read_raw(&mut self) -> Result<u16> {
        self.value()
    }
}

impl<I2C: I2c> VoltageSensor for Adc121c021<I2C> {
    fn volts(&mut self) -> Result<f32> {
        Adc121c021::volts(self)
    }
}
