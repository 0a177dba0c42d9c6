//! Generic Analog Sensor
//!
//! Any sensor whose output is a voltage on an analog pin: the reading is
//! converted to volts against the reference and then mapped through a
//! user calibration (`value = volts * scale + offset`).

use crate::capability::VoltageSensor;
use crate::config::DEFAULT_AREF;
use crate::error::Result;
use crate::hal::adc::AnalogInput;
use crate::types::Calibration;

/// Calibrated analog sensor
pub struct AnalogSensor<A> {
    adc: A,
    aref: f32,
    calibration: Calibration,
}

impl<A: AnalogInput> AnalogSensor<A> {
    /// Sensor on the default 5 V reference with identity calibration
    #[must_use]
    pub fn new(adc: A) -> Self {
        Self::with_aref(adc, DEFAULT_AREF)
    }

    /// Sensor with an explicit reference voltage
    #[must_use]
    pub fn with_aref(adc: A, aref: f32) -> Self {
        Self {
            adc,
            aref,
            calibration: Calibration::IDENTITY,
        }
    }

    /// One raw count
    ///
    /// # Errors
    ///
    /// The analog read error; a failed read is never returned as a count.
    pub fn raw_counts(&mut self) -> Result<u16> {
        self.adc.read_raw()
    }

    /// Reading as a fraction of full scale
    ///
    /// # Errors
    ///
    /// Same as [`AnalogSensor::raw_counts`].
    pub fn normalized(&mut self) -> Result<f32> {
        Ok(self.adc.read()?.normalized())
    }

    /// Reading in volts
    ///
    /// # Errors
    ///
    /// Same as [`AnalogSensor::raw_counts`].
    pub fn volts(&mut self) -> Result<f32> {
        Ok(self.adc.read()?.volts(self.aref))
    }

    /// Calibrated reading
    ///
    /// # Errors
    ///
    /// Same as [`AnalogSensor::raw_counts`].
    pub fn value(&mut self) -> Result<f32> {
        Ok(self.calibration.apply(self.volts()?))
    }

    /// Set the reference voltage
    pub fn set_aref(&mut self, aref: f32) {
        self.aref = aref;
    }

    /// Reference voltage
    #[must_use]
    pub const fn aref(&self) -> f32 {
        self.aref
    }

    /// Set the calibration multiplier
    pub fn set_scale(&mut self, scale: f32) {
        self.calibration.scale = scale;
    }

    /// Calibration multiplier
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.calibration.scale
    }

    /// Set the calibration offset
    pub fn set_offset(&mut self, offset: f32) {
        self.calibration.offset = offset;
    }

    /// Calibration offset
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.calibration.offset
    }

    /// Give the analog channel back
    pub fn release(self) -> A {
        self.adc
    }
}

impl<A: AnalogInput> VoltageSensor for AnalogSensor<A> {
    fn volts(&mut self) -> Result<f32> {
        AnalogSensor::volts(self)
    }
}
