//! Capability traits
//!
//! Unrelated devices that measure the same quantity share one trait, so
//! callers can be written against "a temperature sensor" rather than a
//! specific part. Every trait is object safe.

use crate::error::Result;
use crate::types::{convert_cm_to, DistanceUnit, TemperatureUnit};

/// Anything that measures temperature
pub trait TemperatureSensor {
    /// Take a measurement in degrees Celsius.
    ///
    /// # Errors
    ///
    /// Any bus or device error of the implementation.
    fn temperature_celsius(&mut self) -> Result<f32>;

    /// Take a measurement in `unit`.
    ///
    /// # Errors
    ///
    /// Same as [`TemperatureSensor::temperature_celsius`].
    fn temperature(&mut self, unit: TemperatureUnit) -> Result<f32> {
        Ok(unit.from_celsius(self.temperature_celsius()?))
    }
}

/// Anything that measures distance
pub trait DistanceSensor {
    /// Take a measurement in centimeters.
    ///
    /// # Errors
    ///
    /// Any bus or device error of the implementation.
    fn distance_cm(&mut self) -> Result<f32>;

    /// Take a measurement in `unit`.
    ///
    /// # Errors
    ///
    /// Same as [`DistanceSensor::distance_cm`].
    fn distance(&mut self, unit: DistanceUnit) -> Result<f32> {
        Ok(convert_cm_to(self.distance_cm()?, unit))
    }
}

/// Relative humidity in percent
pub trait HumiditySensor {
    /// Take a measurement.
    ///
    /// # Errors
    ///
    /// Any bus or device error of the implementation.
    fn relative_humidity(&mut self) -> Result<f32>;
}

/// Electrical conductivity in mS/cm
pub trait EcSensor {
    /// Take a measurement.
    ///
    /// # Errors
    ///
    /// Any bus or device error of the implementation.
    fn ec(&mut self) -> Result<f32>;
}

/// A voltage measurement
pub trait VoltageSensor {
    /// Take a measurement.
    ///
    /// # Errors
    ///
    /// Any bus or device error of the implementation.
    fn volts(&mut self) -> Result<f32>;
}

/// A binary actuator
pub trait Switch {
    /// Turn on.
    ///
    /// # Errors
    ///
    /// Any bus error of the implementation.
    fn on(&mut self) -> Result<()>;

    /// Turn off.
    ///
    /// # Errors
    ///
    /// Any bus error of the implementation.
    fn off(&mut self) -> Result<()>;

    /// Last commanded state
    fn is_on(&self) -> bool;
}
