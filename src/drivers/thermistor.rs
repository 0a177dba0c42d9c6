//! Grove Temperature Sensor
//!
//! NTC thermistor in a divider with a 10 kΩ resistor. The resistance is
//! recovered from the divider ratio and converted with the B-parameter
//! equation.

#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use crate::capability::TemperatureSensor;
use crate::config::{THERMISTOR_B, THERMISTOR_R0};
use crate::error::{Error, Result};
use crate::hal::adc::AnalogInput;
use crate::types::Calibration;

/// 25 °C in kelvin
const T0_K: f32 = 298.15;

/// Convert a divider reading to °C.
///
/// # Errors
///
/// [`Error::OutOfRange`] for a zero reading (open divider) or a full-scale
/// reading (shorted thermistor).
pub fn counts_to_celsius(raw: u16, max_count: u16) -> Result<f32> {
    if raw == 0 || raw >= max_count {
        return Err(Error::OutOfRange("thermistor reading"));
    }
    let resistance = f32::from(max_count - raw) * THERMISTOR_R0 / f32::from(raw);
    let inv_t = (resistance / THERMISTOR_R0).ln() / THERMISTOR_B + 1.0 / T0_K;
    Ok(1.0 / inv_t - 273.15)
}

/// Grove temperature driver
pub struct GroveTemperature<A> {
    adc: A,
    calibration: Calibration,
}

impl<A: AnalogInput> GroveTemperature<A> {
    /// Sensor with identity calibration
    #[must_use]
    pub fn new(adc: A) -> Self {
        Self {
            adc,
            calibration: Calibration::IDENTITY,
        }
    }

    /// Temperature in °C with the calibration applied
    ///
    /// # Errors
    ///
    /// The analog read error, or [`Error::OutOfRange`] from
    /// [`counts_to_celsius`].
    pub fn temperature(&mut self) -> Result<f32> {
        let reading = self.adc.read()?;
        let celsius = counts_to_celsius(reading.raw(), reading.max_count())?;
        Ok(self.calibration.apply(celsius))
    }

    /// Set the calibration multiplier
    pub fn set_scale(&mut self, scale: f32) {
        self.calibration.scale = scale;
    }

    /// Set the calibration offset (°C)
    pub fn set_offset(&mut self, offset: f32) {
        self.calibration.offset = offset;
    }

    /// Current calibration
    #[must_use]
    pub const fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Give the analog channel back
    pub fn release(self) -> A {
        self.adc
    }
}

impl<A: AnalogInput> TemperatureSensor for GroveTemperature<A> {
    fn temperature_celsius(&mut self) -> Result<f32> {
        self.temperature()
    }
}
