//! GPIO Abstractions
//!
//! Small wrappers that give a digital line its meaning: an LED, a relay,
//! a push button. Every wrapper owns its pin and hands it back from
//! `release`.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::capability::Switch;
use crate::error::{Error, Result};

/// Logic level a line is considered "active" at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Asserted when the line is high
    #[default]
    High,
    /// Asserted when the line is low
    Low,
}

/// LED state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedState {
    /// LED is off
    #[default]
    Off,
    /// LED is on
    On,
}

impl LedState {
    /// Toggle the LED state
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

/// Single LED driver
pub struct Led<P> {
    pin: P,
    state: LedState,
}

impl<P: OutputPin> Led<P> {
    /// Create a new LED (driven off)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn new(mut pin: P) -> Result<Self> {
        pin.set_low().map_err(Error::gpio)?;
        Ok(Self {
            pin,
            state: LedState::Off,
        })
    }

    /// Turn LED on
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn on(&mut self) -> Result<()> {
        self.pin.set_high().map_err(Error::gpio)?;
        self.state = LedState::On;
        Ok(())
    }

    /// Turn LED off
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn off(&mut self) -> Result<()> {
        self.pin.set_low().map_err(Error::gpio)?;
        self.state = LedState::Off;
        Ok(())
    }

    /// Toggle LED state
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn toggle(&mut self) -> Result<()> {
        match self.state {
            LedState::Off => self.on(),
            LedState::On => self.off(),
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.state
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Switch for Led<P> {
    fn on(&mut self) -> Result<()> {
        Led::on(self)
    }

    fn off(&mut self) -> Result<()> {
        Led::off(self)
    }

    fn is_on(&self) -> bool {
        self.state == LedState::On
    }
}

/// Relay control (starts open)
pub struct Relay<P> {
    pin: P,
    level: ActiveLevel,
    closed: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Create relay control for an active-high coil driver
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn new(pin: P) -> Result<Self> {
        Self::with_level(pin, ActiveLevel::High)
    }

    /// Create relay control with an explicit active level
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn with_level(pin: P, level: ActiveLevel) -> Result<Self> {
        let mut relay = Self {
            pin,
            level,
            closed: true,
        };
        relay.open()?;
        Ok(relay)
    }

    /// Energise the coil
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn close(&mut self) -> Result<()> {
        self.drive(true)?;
        self.closed = true;
        Ok(())
    }

    /// De-energise the coil
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be driven.
    pub fn open(&mut self) -> Result<()> {
        self.drive(false)?;
        self.closed = false;
        Ok(())
    }

    /// Check if the relay is closed
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, active: bool) -> Result<()> {
        let high = match self.level {
            ActiveLevel::High => active,
            ActiveLevel::Low => !active,
        };
        if high {
            self.pin.set_high().map_err(Error::gpio)
        } else {
            self.pin.set_low().map_err(Error::gpio)
        }
    }
}

impl<P: OutputPin> Switch for Relay<P> {
    fn on(&mut self) -> Result<()> {
        self.close()
    }

    fn off(&mut self) -> Result<()> {
        self.open()
    }

    fn is_on(&self) -> bool {
        self.closed
    }
}

/// Push button input
pub struct Button<P> {
    pin: P,
    level: ActiveLevel,
}

impl<P: InputPin> Button<P> {
    /// Button that pulls the line high when pressed
    #[must_use]
    pub fn new(pin: P) -> Self {
        Self::with_level(pin, ActiveLevel::High)
    }

    /// Button with an explicit active level (e.g. low with a pull-up)
    #[must_use]
    pub fn with_level(pin: P, level: ActiveLevel) -> Self {
        Self { pin, level }
    }

    /// Check if the button is pressed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin cannot be read.
    pub fn is_pressed(&mut self) -> Result<bool> {
        read_active(&mut self.pin, self.level)
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

/// Read a line and report whether it is at its active level.
pub(crate) fn read_active<P: InputPin>(pin: &mut P, level: ActiveLevel) -> Result<bool> {
    match level {
        ActiveLevel::High => pin.is_high().map_err(Error::gpio),
        ActiveLevel::Low => pin.is_low().map_err(Error::gpio),
    }
}
