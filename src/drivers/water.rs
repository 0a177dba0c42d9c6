//! Grove Water Sensor
//!
//! Interleaved traces pull the signal line low when bridged by water.

use embedded_hal::digital::InputPin;

use crate::error::Result;
use crate::hal::gpio::{read_active, ActiveLevel};

/// Water sensor on one digital input
pub struct WaterSensor<P> {
    pin: P,
}

impl<P: InputPin> WaterSensor<P> {
    /// Wrap the input line
    #[must_use]
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Whether the traces are wet
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Gpio`] if the line cannot be read.
    pub fn is_wet(&mut self) -> Result<bool> {
        read_active(&mut self.pin, ActiveLevel::Low)
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}
