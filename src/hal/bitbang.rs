//! Bit-level transfer primitives
//!
//! Clocked serial protocols for devices without a bus controller: a GPIO
//! clock toggled by software while a data line is sampled or driven.
//! Used by the HX711 load-cell ADC (clock out, data in) and the MY9221 LED
//! driver (data out on both clock edges).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::config::BITBANG_HALF_PERIOD_NS;
use crate::error::{Error, Result};

/// How long to wait for a device to signal ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaitConfig {
    /// Give up after this long. `None` waits forever; a disconnected
    /// device then blocks the caller indefinitely.
    pub timeout_us: Option<u32>,
    /// Time between two polls of the ready line
    pub poll_interval_us: u32,
}

impl WaitConfig {
    /// Bounded wait
    #[must_use]
    pub const fn bounded(timeout_us: u32, poll_interval_us: u32) -> Self {
        Self {
            timeout_us: Some(timeout_us),
            poll_interval_us,
        }
    }

    /// Unbounded wait
    #[must_use]
    pub const fn unbounded(poll_interval_us: u32) -> Self {
        Self {
            timeout_us: None,
            poll_interval_us,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::bounded(
            crate::config::DEFAULT_READY_TIMEOUT_US,
            crate::config::DEFAULT_READY_POLL_US,
        )
    }
}

/// Block until `pin` reads `level`.
///
/// # Errors
///
/// [`Error::Timeout`] once `config.timeout_us` has elapsed,
/// [`Error::Gpio`] if the line cannot be read.
pub fn wait_for_level<P, D>(pin: &mut P, level: PinState, delay: &mut D, config: &WaitConfig) -> Result<()>
where
    P: InputPin,
    D: DelayNs,
{
    let poll_us = config.poll_interval_us.max(1);
    let mut waited_us: u32 = 0;

    loop {
        let reached = match level {
            PinState::Low => pin.is_low(),
            PinState::High => pin.is_high(),
        }
        .map_err(Error::gpio)?;

        if reached {
            return Ok(());
        }

        if let Some(timeout_us) = config.timeout_us {
            if waited_us >= timeout_us {
                return Err(Error::Timeout { waited_us });
            }
        }

        delay.delay_us(poll_us);
        waited_us = waited_us.saturating_add(poll_us);
    }
}

/// Clock `bits` bits in from `data`, MSB first.
///
/// Per bit: raise clock, shift the accumulator, sample data, lower clock.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for more than 32 bits, [`Error::Gpio`] on a
/// pin failure.
pub fn shift_in<C, I, D>(clk: &mut C, data: &mut I, delay: &mut D, bits: u8) -> Result<u32>
where
    C: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    if bits > 32 {
        return Err(Error::InvalidArgument("shift_in supports at most 32 bits"));
    }

    let mut value: u32 = 0;
    for _ in 0..bits {
        clk.set_high().map_err(Error::gpio)?;
        delay.delay_ns(BITBANG_HALF_PERIOD_NS);
        value <<= 1;
        if data.is_high().map_err(Error::gpio)? {
            value |= 1;
        }
        clk.set_low().map_err(Error::gpio)?;
        delay.delay_ns(BITBANG_HALF_PERIOD_NS);
    }
    Ok(value)
}

/// Emit `count` clock pulses without sampling.
///
/// # Errors
///
/// Returns [`Error::Gpio`] on a pin failure.
pub fn clock_pulses<C, D>(clk: &mut C, delay: &mut D, count: u8) -> Result<()>
where
    C: OutputPin,
    D: DelayNs,
{
    for _ in 0..count {
        clk.set_high().map_err(Error::gpio)?;
        delay.delay_ns(BITBANG_HALF_PERIOD_NS);
        clk.set_low().map_err(Error::gpio)?;
        delay.delay_ns(BITBANG_HALF_PERIOD_NS);
    }
    Ok(())
}

/// A clock line that changes level once per bit.
///
/// Double-edge devices latch data on every transition, so the level is
/// tracked in software rather than read back from the pin.
pub struct ToggleClock<C> {
    pin: C,
    high: bool,
}

impl<C: OutputPin> ToggleClock<C> {
    /// Take the clock pin and drive it low
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] on a pin failure.
    pub fn new(mut pin: C) -> Result<Self> {
        pin.set_low().map_err(Error::gpio)?;
        Ok(Self { pin, high: false })
    }

    /// Flip the clock level
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] on a pin failure.
    pub fn toggle(&mut self) -> Result<()> {
        self.high = !self.high;
        self.pin
            .set_state(PinState::from(self.high))
            .map_err(Error::gpio)
    }

    /// Current clock level
    #[must_use]
    pub const fn is_high(&self) -> bool {
        self.high
    }

    /// Give the pin back
    pub fn release(self) -> C {
        self.pin
    }
}

/// Shift `bits` bits of `word` out MSB first, one clock edge per bit.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for more than 32 bits, [`Error::Gpio`] on a
/// pin failure.
pub fn shift_out_toggle<O, C>(data: &mut O, clk: &mut ToggleClock<C>, word: u32, bits: u8) -> Result<()>
where
    O: OutputPin,
    C: OutputPin,
{
    if bits > 32 {
        return Err(Error::InvalidArgument("shift_out supports at most 32 bits"));
    }

    for bit in (0..bits).rev() {
        let state = PinState::from(word & (1 << bit) != 0);
        data.set_state(state).map_err(Error::gpio)?;
        clk.toggle()?;
    }
    Ok(())
}
