//! Hobby Servo Driver
//!
//! Position is set by the width of a pulse repeated every 20 ms. The PWM
//! channel must already run at the configured period; the driver only
//! writes duty cycles. Defaults match the ES08A micro servo.

use embedded_hal::pwm::SetDutyCycle;

use crate::error::{Error, Result};
use crate::hal::pwm::pulse_to_duty;

/// Pulse timing of one servo model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    /// Pulse width at 0°
    pub min_pulse_us: u32,
    /// Pulse width at `max_angle`
    pub max_pulse_us: u32,
    /// PWM period
    pub period_us: u32,
    /// Largest angle in degrees
    pub max_angle: u16,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 600,
            max_pulse_us: 2200,
            period_us: 20_000,
            max_angle: 180,
        }
    }
}

impl ServoConfig {
    /// Pulse width for an angle, clamped to `max_angle`
    #[must_use]
    pub fn pulse_for(&self, angle: u16) -> u32 {
        let angle = u32::from(angle.min(self.max_angle));
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us);
        self.min_pulse_us + span * angle / u32::from(self.max_angle.max(1))
    }
}

/// Servo on one PWM channel
pub struct Servo<P> {
    pwm: P,
    config: ServoConfig,
    angle: Option<u16>,
}

impl<P: SetDutyCycle> Servo<P> {
    /// Servo with the given timing. The position is unknown until the
    /// first [`Servo::set_angle`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the pulse range is empty or does not
    /// fit in the period.
    pub fn new(pwm: P, config: ServoConfig) -> Result<Self> {
        if config.min_pulse_us >= config.max_pulse_us
            || config.max_pulse_us > config.period_us
            || config.max_angle == 0
        {
            return Err(Error::InvalidArgument("servo timing"));
        }
        Ok(Self {
            pwm,
            config,
            angle: None,
        })
    }

    /// Move to `angle` degrees
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] past `max_angle`, [`Error::Pwm`] if the
    /// channel rejects the duty cycle.
    pub fn set_angle(&mut self, angle: u16) -> Result<()> {
        if angle > self.config.max_angle {
            return Err(Error::OutOfRange("servo angle"));
        }
        let pulse = self.config.pulse_for(angle);
        let duty = pulse_to_duty(pulse, self.config.period_us, self.pwm.max_duty_cycle());
        self.pwm.set_duty_cycle(duty).map_err(Error::pwm)?;
        trace!("servo {} deg -> {} us", angle, pulse);
        self.angle = Some(angle);
        Ok(())
    }

    /// Last commanded angle
    #[must_use]
    pub const fn angle(&self) -> Option<u16> {
        self.angle
    }

    /// Pulse timing
    #[must_use]
    pub const fn config(&self) -> ServoConfig {
        self.config
    }

    /// Give the channel back
    pub fn release(self) -> P {
        self.pwm
    }
}
