//! `SX6119` FM Receiver
//!
//! Push-button style control: pulling a line low for 100 ms toggles power
//! or starts a seek. Both lines idle high.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::SX6119_PULSE_MS;
use crate::error::{Error, Result};

/// SX6119 driver
pub struct Sx6119<PWR, SEEK, D> {
    power: PWR,
    seek: SEEK,
    delay: D,
    powered: bool,
}

impl<PWR: OutputPin, SEEK: OutputPin, D: DelayNs> Sx6119<PWR, SEEK, D> {
    /// Take both lines and drive them idle. The receiver is assumed off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if a line cannot be driven.
    pub fn new(mut power: PWR, mut seek: SEEK, delay: D) -> Result<Self> {
        power.set_high().map_err(Error::gpio)?;
        seek.set_high().map_err(Error::gpio)?;
        Ok(Self {
            power,
            seek,
            delay,
            powered: false,
        })
    }

    /// Press the power button
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the line cannot be driven.
    pub fn toggle_power(&mut self) -> Result<()> {
        press(&mut self.power, &mut self.delay)?;
        self.powered = !self.powered;
        Ok(())
    }

    /// Press the seek button
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the line cannot be driven.
    pub fn seek(&mut self) -> Result<()> {
        press(&mut self.seek, &mut self.delay)
    }

    /// Power state as tracked from the presses sent
    #[must_use]
    pub const fn is_powered(&self) -> bool {
        self.powered
    }

    /// Give the lines and delay back
    pub fn release(self) -> (PWR, SEEK, D) {
        (self.power, self.seek, self.delay)
    }
}

fn press<P: OutputPin, D: DelayNs>(pin: &mut P, delay: &mut D) -> Result<()> {
    pin.set_low().map_err(Error::gpio)?;
    delay.delay_ms(SX6119_PULSE_MS);
    pin.set_high().map_err(Error::gpio)
}
