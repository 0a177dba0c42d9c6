//! `HLG-150H` Dimmable LED Power Supply
//!
//! A relay switches the supply on and off; a PWM signal on the dimming
//! input sets the brightness.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::capability::Switch;
use crate::error::{Error, Result};
use crate::hal::gpio::Relay;
use crate::hal::pwm::{apply, DutyCycle};

/// HLG-150H driver
pub struct Hlg150h<RELAY, PWM> {
    relay: Relay<RELAY>,
    dimmer: PWM,
    brightness: u8,
    duty: DutyCycle,
}

impl<RELAY: OutputPin, PWM: SetDutyCycle> Hlg150h<RELAY, PWM> {
    /// Take both lines; starts switched off at full brightness.
    ///
    /// # Errors
    ///
    /// [`Error::Gpio`] or [`Error::Pwm`] if a line cannot be driven.
    pub fn new(relay: RELAY, dimmer: PWM) -> Result<Self> {
        let mut dev = Self {
            relay: Relay::new(relay)?,
            dimmer,
            brightness: 0,
            duty: DutyCycle::ZERO,
        };
        dev.set_brightness(100)?;
        Ok(dev)
    }

    /// Switch the supply on
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the relay cannot be driven.
    pub fn on(&mut self) -> Result<()> {
        self.relay.close()
    }

    /// Switch the supply off
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the relay cannot be driven.
    pub fn off(&mut self) -> Result<()> {
        self.relay.open()
    }

    /// Whether the supply is switched on
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.relay.is_closed()
    }

    /// Set the brightness in percent
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] above 100, [`Error::Pwm`] if the channel
    /// rejects the duty cycle.
    pub fn set_brightness(&mut self, percent: u8) -> Result<()> {
        if percent > 100 {
            return Err(Error::InvalidArgument("brightness above 100 %"));
        }
        let duty = DutyCycle::from_percent(percent);
        apply(&mut self.dimmer, duty)?;
        self.brightness = percent;
        self.duty = duty;
        Ok(())
    }

    /// Brightness in percent
    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Duty cycle currently on the dimming input
    #[must_use]
    pub const fn duty(&self) -> DutyCycle {
        self.duty
    }

    /// Give both lines back
    pub fn release(self) -> (RELAY, PWM) {
        (self.relay.release(), self.dimmer)
    }
}

impl<RELAY: OutputPin, PWM: SetDutyCycle> Switch for Hlg150h<RELAY, PWM> {
    fn on(&mut self) -> Result<()> {
        Hlg150h::on(self)
    }

    fn off(&mut self) -> Result<()> {
        Hlg150h::off(self)
    }

    fn is_on(&self) -> bool {
        Hlg150h::is_on(self)
    }
}
