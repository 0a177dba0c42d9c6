//! `ISD1820` Voice Recorder
//!
//! Two active-high control lines: PLAYL plays the stored message while
//! held, REC records while held. Only one may be asserted at a time, so
//! asserting one always releases the other first.

use embedded_hal::digital::OutputPin;

use crate::error::{Error, Result};

/// What the recorder is doing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecorderMode {
    /// Both lines released
    #[default]
    Idle,
    /// PLAYL asserted
    Playing,
    /// REC asserted
    Recording,
}

/// ISD1820 driver
pub struct Isd1820<PLAY, REC> {
    play: PLAY,
    rec: REC,
    mode: RecorderMode,
}

impl<PLAY: OutputPin, REC: OutputPin> Isd1820<PLAY, REC> {
    /// Take both lines and release them
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if a line cannot be driven.
    pub fn new(play: PLAY, rec: REC) -> Result<Self> {
        let mut dev = Self {
            play,
            rec,
            mode: RecorderMode::Idle,
        };
        dev.stop()?;
        Ok(dev)
    }

    /// Start or stop playback
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if a line cannot be driven.
    pub fn play(&mut self, enable: bool) -> Result<()> {
        if enable {
            self.rec.set_low().map_err(Error::gpio)?;
            self.play.set_high().map_err(Error::gpio)?;
            self.mode = RecorderMode::Playing;
        } else {
            self.play.set_low().map_err(Error::gpio)?;
            if self.mode == RecorderMode::Playing {
                self.mode = RecorderMode::Idle;
            }
        }
        Ok(())
    }

    /// Start or stop recording
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if a line cannot be driven.
    pub fn record(&mut self, enable: bool) -> Result<()> {
        if enable {
            self.play.set_low().map_err(Error::gpio)?;
            self.rec.set_high().map_err(Error::gpio)?;
            self.mode = RecorderMode::Recording;
        } else {
            self.rec.set_low().map_err(Error::gpio)?;
            if self.mode == RecorderMode::Recording {
                self.mode = RecorderMode::Idle;
            }
        }
        Ok(())
    }

    /// Release both lines
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if a line cannot be driven.
    pub fn stop(&mut self) -> Result<()> {
        self.play.set_low().map_err(Error::gpio)?;
        self.rec.set_low().map_err(Error::gpio)?;
        self.mode = RecorderMode::Idle;
        Ok(())
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> RecorderMode {
        self.mode
    }

    /// Give both lines back
    pub fn release(self) -> (PLAY, REC) {
        (self.play, self.rec)
    }
}
