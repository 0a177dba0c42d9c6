//! Grove Gas O2 Sensor
//!
//! Electrochemical cell with an amplifier; 2.0 V at the output corresponds
//! to the 21 % oxygen of ambient air on a 3.3 V board.

use crate::config::GROVE_O2_AREF;
use crate::error::Result;
use crate::hal::adc::AnalogInput;

/// Output voltage in clean air
const AIR_VOLTS: f32 = 2.0;

/// Oxygen fraction of air
const AIR_O2: f32 = 0.21;

/// Grove O2 driver
pub struct GroveO2<A> {
    adc: A,
    aref: f32,
}

impl<A: AnalogInput> GroveO2<A> {
    /// Sensor on the 3.3 V Grove reference
    #[must_use]
    pub fn new(adc: A) -> Self {
        Self {
            adc,
            aref: GROVE_O2_AREF,
        }
    }

    /// Output voltage
    ///
    /// # Errors
    ///
    /// The analog read error.
    pub fn volts(&mut self) -> Result<f32> {
        Ok(self.adc.read()?.volts(self.aref))
    }

    /// Oxygen concentration in percent
    ///
    /// # Errors
    ///
    /// The analog read error.
    pub fn concentration(&mut self) -> Result<f32> {
        Ok(self.volts()? * AIR_O2 / AIR_VOLTS * 100.0)
    }

    /// Give the analog channel back
    pub fn release(self) -> A {
        self.adc
    }
}
