//! `HX711` 24-bit Load-Cell ADC Driver
//!
//! The HX711 has no bus controller: the host clocks PD_SCK and samples
//! DOUT by hand. DOUT falls when a conversion is ready; 24 clock pulses
//! shift the result out MSB first, and 1 to 3 extra pulses select the
//! channel and gain of the *next* conversion.
//!
//! Raw results are 24-bit two's complement. [`flip_sign`] moves them onto
//! an unsigned scale centred at `0x800000`, which is what the calibration
//! math (`offset`, `scale`) works on.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::config::{HX711_DATA_BITS, HX711_POWER_DOWN_US, HX711_SIGN_FLIP};
use crate::error::{Error, Result};
use crate::hal::bitbang::{clock_pulses, shift_in, wait_for_level, WaitConfig};

/// Input channel and gain, selected by trailing clock pulses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// Channel A, gain 128
    #[default]
    A128,
    /// Channel B, gain 32
    B32,
    /// Channel A, gain 64
    A64,
}

impl Gain {
    /// Extra clock pulses after the data bits
    #[must_use]
    pub const fn pulses(self) -> u8 {
        match self {
            Self::A128 => 1,
            Self::B32 => 2,
            Self::A64 => 3,
        }
    }

    /// Amplification factor
    #[must_use]
    pub const fn factor(self) -> u8 {
        match self {
            Self::A128 => 128,
            Self::B32 => 32,
            Self::A64 => 64,
        }
    }
}

/// Construction parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hx711Config {
    /// Gain and channel used from the first conversion on
    pub gain: Gain,
    /// Bound on the ready-line wait of every read
    pub wait: WaitConfig,
}

/// Flip the sign bit of a 24-bit conversion.
///
/// Applying it twice gives the input back.
#[must_use]
pub const fn flip_sign(raw: u32) -> u32 {
    (raw ^ HX711_SIGN_FLIP) & 0x00FF_FFFF
}

/// Interpret a 24-bit two's complement value.
#[must_use]
pub const fn to_signed(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}

/// HX711 driver
pub struct Hx711<CLK, DOUT, D> {
    clk: CLK,
    dout: DOUT,
    delay: D,
    gain: Gain,
    wait: WaitConfig,
    offset: i64,
    scale: f32,
}

impl<CLK, DOUT, D> Hx711<CLK, DOUT, D>
where
    CLK: OutputPin,
    DOUT: InputPin,
    D: DelayNs,
{
    /// Take the pins, power the chip up and latch the configured gain.
    ///
    /// Latching needs one complete conversion, so a missing device shows up
    /// here as [`Error::Timeout`] unless the wait is unbounded.
    ///
    /// # Errors
    ///
    /// [`Error::Gpio`] on a pin failure, [`Error::Timeout`] if the device
    /// never signals ready.
    pub fn new(clk: CLK, dout: DOUT, delay: D, config: Hx711Config) -> Result<Self> {
        let mut hx = Self {
            clk,
            dout,
            delay,
            gain: config.gain,
            wait: config.wait,
            offset: 0,
            scale: 1.0,
        };
        hx.power_up()?;
        hx.set_gain(config.gain)?;
        debug!("hx711 ready, gain {}", config.gain.factor());
        Ok(hx)
    }

    /// Check whether a conversion is waiting (DOUT low)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if DOUT cannot be read.
    pub fn is_ready(&mut self) -> Result<bool> {
        self.dout.is_low().map_err(Error::gpio)
    }

    /// Read one conversion as an unsigned count.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if DOUT stays high past the wait bound,
    /// [`Error::Gpio`] on a pin failure.
    pub fn read(&mut self) -> Result<u32> {
        wait_for_level(&mut self.dout, PinState::Low, &mut self.delay, &self.wait)?;
        let raw = shift_in(&mut self.clk, &mut self.dout, &mut self.delay, HX711_DATA_BITS)?;
        clock_pulses(&mut self.clk, &mut self.delay, self.gain.pulses())?;
        let count = flip_sign(raw);
        trace!("hx711 raw {:#x} -> {}", raw, count);
        Ok(count)
    }

    /// Integer mean of `times` consecutive reads.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `times` is zero, otherwise the first
    /// [`Hx711::read`] error.
    pub fn read_average(&mut self, times: u8) -> Result<u32> {
        if times == 0 {
            return Err(Error::InvalidArgument("average of zero samples"));
        }
        let mut sum: u64 = 0;
        for _ in 0..times {
            sum += u64::from(self.read()?);
        }
        Ok((sum / u64::from(times)) as u32)
    }

    /// Averaged reading minus the tare offset
    ///
    /// # Errors
    ///
    /// Same as [`Hx711::read_average`].
    pub fn value(&mut self, times: u8) -> Result<i64> {
        Ok(i64::from(self.read_average(times)?) - self.offset)
    }

    /// [`Hx711::value`] divided by the scale
    ///
    /// # Errors
    ///
    /// Same as [`Hx711::read_average`].
    pub fn units(&mut self, times: u8) -> Result<f32> {
        Ok(self.value(times)? as f32 / self.scale)
    }

    /// Make the current load the zero point.
    ///
    /// # Errors
    ///
    /// Same as [`Hx711::read_average`].
    pub fn tare(&mut self, times: u8) -> Result<()> {
        let offset = self.read_average(times)?;
        self.set_offset(i64::from(offset));
        debug!("hx711 tared at {}", offset);
        Ok(())
    }

    /// Select gain and channel.
    ///
    /// The chip only applies a new gain after the following conversion, so
    /// one read is performed and discarded.
    ///
    /// # Errors
    ///
    /// Same as [`Hx711::read`].
    pub fn set_gain(&mut self, gain: Gain) -> Result<()> {
        self.gain = gain;
        self.read().map(|_| ())
    }

    /// Current gain
    #[must_use]
    pub const fn gain(&self) -> Gain {
        self.gain
    }

    /// Set the counts-per-unit divisor.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for zero or a non-finite value.
    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        if scale == 0.0 || !scale.is_finite() {
            return Err(Error::InvalidArgument("scale must be finite and non-zero"));
        }
        self.scale = scale;
        Ok(())
    }

    /// Counts-per-unit divisor
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the tare offset directly
    pub fn set_offset(&mut self, offset: i64) {
        self.offset = offset;
    }

    /// Tare offset
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }

    /// Enter power-down (clock held high for more than 60 µs)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] on a pin failure.
    pub fn power_down(&mut self) -> Result<()> {
        self.clk.set_low().map_err(Error::gpio)?;
        self.clk.set_high().map_err(Error::gpio)?;
        self.delay.delay_us(HX711_POWER_DOWN_US);
        Ok(())
    }

    /// Leave power-down. The chip resets to channel A, gain 128.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] on a pin failure.
    pub fn power_up(&mut self) -> Result<()> {
        self.clk.set_low().map_err(Error::gpio)
    }

    /// Give the pins and delay back
    pub fn release(self) -> (CLK, DOUT, D) {
        (self.clk, self.dout, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_sign_is_an_involution() {
        for raw in [0u32, 1, 0x7F_FFFF, 0x80_0000, 0xFF_FFFF, 0x12_3456] {
            assert_eq!(flip_sign(flip_sign(raw)), raw);
        }
    }

    #[test]
    fn flip_sign_centres_zero() {
        assert_eq!(flip_sign(0), 0x80_0000);
        assert_eq!(flip_sign(0xFF_FFFF), 0x7F_FFFF);
    }

    #[test]
    fn to_signed_extends_bit_23() {
        assert_eq!(to_signed(0xFF_FFFF), -1);
        assert_eq!(to_signed(0x80_0000), -8_388_608);
        assert_eq!(to_signed(0x7F_FFFF), 8_388_607);
    }
}
