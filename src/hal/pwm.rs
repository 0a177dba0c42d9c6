//! PWM Helpers
//!
//! Duty cycle arithmetic for the PWM driven devices. Dimmers work in
//! [`DutyCycle`] fractions, servos in pulse widths. Outputs themselves are
//! `embedded-hal` [`SetDutyCycle`] channels.

use embedded_hal::pwm::SetDutyCycle;

use crate::error::{Error, Result};

/// PWM duty cycle (0-65535)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle(u16);

impl DutyCycle {
    /// 0% duty cycle
    pub const ZERO: Self = Self(0);

    /// 100% duty cycle
    pub const FULL: Self = Self(65535);

    /// Create from percentage (0-100)
    #[must_use]
    pub fn from_percent(percent: u8) -> Self {
        let value = (u32::from(percent.min(100)) * 65535) / 100;
        Self(value as u16)
    }

    /// Get raw 16-bit value
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Get as fraction
    #[must_use]
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 65535.0
    }

    /// Scale onto a channel whose full-on value is `max_duty`, rounding to
    /// the nearest channel step
    #[must_use]
    pub fn to_channel(self, max_duty: u16) -> u16 {
        ((u32::from(self.0) * u32::from(max_duty) + 32767) / 65535) as u16
    }
}

/// Apply a duty cycle to a PWM channel
///
/// # Errors
///
/// Returns [`Error::Pwm`] if the channel rejects the update.
pub fn apply<P: SetDutyCycle>(channel: &mut P, duty: DutyCycle) -> Result<()> {
    let value = duty.to_channel(channel.max_duty_cycle());
    channel.set_duty_cycle(value).map_err(Error::pwm)
}

/// Channel duty value for a pulse of `pulse_us` within `period_us`
#[must_use]
pub fn pulse_to_duty(pulse_us: u32, period_us: u32, max_duty: u16) -> u16 {
    if period_us == 0 {
        return 0;
    }
    let value = u64::from(pulse_us.min(period_us)) * u64::from(max_duty) / u64::from(period_us);
    value as u16
}
