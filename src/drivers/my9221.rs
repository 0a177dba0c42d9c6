//! `MY9221` LED Driver
//!
//! 12-channel constant-current LED driver (Grove LED bar, circular LED).
//! Data is shifted in as 16-bit words on a clock that toggles once per bit:
//! one command word per chip followed by one intensity word per LED.
//! Up to four chips can share the data line.
//!
//! After the last word the data line is pulsed four times while the clock
//! is idle, which latches all chips.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::{
    MY9221_LATCH_HOLD_US, MY9221_LATCH_SETUP_US, MY9221_LEDS_PER_CHIP, MY9221_MAX_CHIPS,
};
use crate::error::{Error, Result};
use crate::hal::bitbang::{shift_out_toggle, ToggleClock};

const MAX_LEDS: usize = MY9221_LEDS_PER_CHIP * MY9221_MAX_CHIPS;

/// Default command word: 8-bit grayscale, internal oscillator
const COMMAND_WORD: u16 = 0x0000;

/// Bar fill direction for [`My9221::set_bar_level`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BarDirection {
    /// Fill from LED 0 upwards
    #[default]
    Up,
    /// Fill from the last LED downwards
    Down,
}

/// MY9221 driver
pub struct My9221<DATA, CLK, D> {
    data: DATA,
    clk: ToggleClock<CLK>,
    delay: D,
    leds: Vec<u16, MAX_LEDS>,
    low: u16,
    high: u16,
    auto_refresh: bool,
}

impl<DATA, CLK, D> My9221<DATA, CLK, D>
where
    DATA: OutputPin,
    CLK: OutputPin,
    D: DelayNs,
{
    /// Take both lines for `chips` chained drivers and switch every LED off.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for zero chips or more than
    /// [`MY9221_MAX_CHIPS`], [`Error::Gpio`] on a pin failure.
    pub fn new(data: DATA, clk: CLK, delay: D, chips: usize) -> Result<Self> {
        if chips == 0 || chips > MY9221_MAX_CHIPS {
            return Err(Error::InvalidArgument("my9221 chip count"));
        }

        let mut leds = Vec::new();
        leds.resize(chips * MY9221_LEDS_PER_CHIP, 0x00)
            .map_err(|()| Error::InvalidArgument("my9221 chip count"))?;

        let mut dev = Self {
            data,
            clk: ToggleClock::new(clk)?,
            delay,
            leds,
            low: 0x00,
            high: 0xFF,
            auto_refresh: true,
        };
        dev.clear_all()?;
        Ok(dev)
    }

    /// Number of addressable LEDs
    #[must_use]
    pub fn max_leds(&self) -> usize {
        self.leds.len()
    }

    /// Switch one LED. Indices past the end address the last LED.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if an automatic refresh fails.
    pub fn set_led(&mut self, index: usize, on: bool) -> Result<()> {
        let last = self.leds.len() - 1;
        let level = if on { self.high } else { self.low };
        self.leds[index.min(last)] = level;
        self.auto()
    }

    /// Switch every LED on
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if an automatic refresh fails.
    pub fn set_all(&mut self) -> Result<()> {
        let high = self.high;
        self.leds.iter_mut().for_each(|led| *led = high);
        self.auto()
    }

    /// Switch every LED off
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if an automatic refresh fails.
    pub fn clear_all(&mut self) -> Result<()> {
        let low = self.low;
        self.leds.iter_mut().for_each(|led| *led = low);
        self.auto()
    }

    /// Light the first `level` LEDs in `direction` and switch the rest off.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a level above [`My9221::max_leds`],
    /// [`Error::Gpio`] if an automatic refresh fails.
    pub fn set_bar_level(&mut self, level: usize, direction: BarDirection) -> Result<()> {
        let count = self.leds.len();
        if level > count {
            return Err(Error::OutOfRange("my9221 bar level"));
        }
        let (low, high) = (self.low, self.high);
        for (i, led) in self.leds.iter_mut().enumerate() {
            let lit = match direction {
                BarDirection::Up => i < level,
                BarDirection::Down => i >= count - level,
            };
            *led = if lit { high } else { low };
        }
        self.auto()
    }

    /// Intensity used for "off" (8-bit)
    pub fn set_low_intensity(&mut self, intensity: u8) {
        self.low = u16::from(intensity);
    }

    /// Intensity used for "on" (8-bit)
    pub fn set_high_intensity(&mut self, intensity: u8) {
        self.high = u16::from(intensity);
    }

    /// Refresh after every change (default), or only on [`My9221::refresh`]
    pub fn set_auto_refresh(&mut self, enable: bool) {
        self.auto_refresh = enable;
    }

    /// Shift the LED states out and latch them
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] on a pin failure.
    pub fn refresh(&mut self) -> Result<()> {
        for (i, &level) in self.leds.iter().enumerate() {
            if i % MY9221_LEDS_PER_CHIP == 0 {
                shift_out_toggle(&mut self.data, &mut self.clk, u32::from(COMMAND_WORD), 16)?;
            }
            shift_out_toggle(&mut self.data, &mut self.clk, u32::from(level), 16)?;
        }
        self.latch()
    }

    /// Give the lines and delay back
    pub fn release(self) -> (DATA, CLK, D) {
        (self.data, self.clk.release(), self.delay)
    }

    fn auto(&mut self) -> Result<()> {
        if self.auto_refresh {
            self.refresh()
        } else {
            Ok(())
        }
    }

    fn latch(&mut self) -> Result<()> {
        self.data.set_low().map_err(Error::gpio)?;
        self.delay.delay_us(MY9221_LATCH_SETUP_US);
        for _ in 0..4 {
            self.data.set_high().map_err(Error::gpio)?;
            self.data.set_low().map_err(Error::gpio)?;
        }
        self.delay.delay_us(MY9221_LATCH_HOLD_US);
        Ok(())
    }
}
