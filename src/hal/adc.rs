//! Analog Input
//!
//! `embedded-hal` 1.0 has no ADC trait, so analog channels implement
//! [`AnalogInput`]: a blocking raw read plus the converter resolution.
//! [`AdcReading`] turns raw counts into normalised and volt values.

use crate::error::Result;
use crate::types::counts_to_volts;

/// One analog input channel.
pub trait AnalogInput {
    /// Converter resolution in bits (10 for most SBC analog headers)
    fn resolution_bits(&self) -> u8;

    /// Take one blocking sample.
    ///
    /// # Errors
    ///
    /// Implementations return [`crate::Error::Analog`] (or the bus error of
    /// an external converter) when no sample could be taken. A failed read
    /// must never be reported as a count.
    fn read_raw(&mut self) -> Result<u16>;

    /// Sample and attach the resolution.
    ///
    /// # Errors
    ///
    /// Propagates [`AnalogInput::read_raw`] errors.
    fn read(&mut self) -> Result<AdcReading> {
        let raw = self.read_raw()?;
        Ok(AdcReading::new(raw, self.resolution_bits()))
    }
}

impl<A: AnalogInput + ?Sized> AnalogInput for &mut A {
    fn resolution_bits(&self) -> u8 {
        (**self).resolution_bits()
    }

    fn read_raw(&mut self) -> Result<u16> {
        (**self).read_raw()
    }
}

/// ADC reading result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcReading {
    raw: u16,
    bits: u8,
}

impl AdcReading {
    /// Create a reading from a raw count and converter resolution
    #[must_use]
    pub const fn new(raw: u16, bits: u8) -> Self {
        Self { raw, bits }
    }

    /// Get the raw count
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.raw
    }

    /// Converter resolution in bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Largest count the converter can produce (`2^bits - 1`)
    #[must_use]
    pub const fn max_count(self) -> u16 {
        max_count(self.bits)
    }

    /// Reading as a fraction of full scale (0.0-1.0). Zero for a converter
    /// reporting no resolution.
    #[must_use]
    pub fn normalized(self) -> f32 {
        match self.max_count() {
            0 => 0.0,
            max => f32::from(self.raw) / f32::from(max),
        }
    }

    /// Convert to voltage against the given reference
    #[must_use]
    pub fn volts(self, aref: f32) -> f32 {
        counts_to_volts(self.raw, self.max_count(), aref)
    }
}

/// Largest count of a converter with the given resolution
#[must_use]
pub const fn max_count(bits: u8) -> u16 {
    if bits >= 16 {
        u16::MAX
    } else {
        (1u16 << bits) - 1
    }
}

/// Mean of `samples` consecutive raw reads, with `delay_us` between them.
///
/// # Errors
///
/// Returns the first read error; no partial average is produced.
pub fn average_raw<A, D>(adc: &mut A, delay: &mut D, samples: u16, delay_us: u32) -> Result<f32>
where
    A: AnalogInput + ?Sized,
    D: embedded_hal::delay::DelayNs,
{
    let samples = samples.max(1);
    let mut sum: u32 = 0;
    for _ in 0..samples {
        sum += u32::from(adc.read_raw()?);
        delay.delay_us(delay_us);
    }
    Ok(sum as f32 / f32::from(samples))
}
