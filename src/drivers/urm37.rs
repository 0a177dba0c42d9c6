//! `URM37` Ultrasonic Ranger Driver
//!
//! The URM37 v4 has two interfaces. In UART mode it answers 4-byte
//! commands (`[cmd, arg1, arg2, sum]`, where `sum` is the byte sum of the
//! first three) and can also report temperature and access its EEPROM. In
//! analog mode the host pulls the trigger line low and samples a voltage
//! proportional to distance (6.8 mV/cm).
//!
//! Both modes pulse the reset line at construction and then wait for the
//! module to boot.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};

use crate::capability::{DistanceSensor, TemperatureSensor};
use crate::config::{
    URM37_MAX_DEGREE_INDEX, URM37_MAX_EEPROM_ADDR, URM37_MAX_RETRIES, URM37_MV_PER_CM,
    URM37_RESET_PULSE_US, URM37_RESET_SETTLE_MS, URM37_WAIT_TIMEOUT_MS,
};
use crate::error::{Error, Result};
use crate::hal::adc::AnalogInput;

/// Command bytes
mod cmd {
    pub const TEMPERATURE: u8 = 0x11;
    pub const DISTANCE: u8 = 0x22;
    pub const READ_EEPROM: u8 = 0x33;
    pub const WRITE_EEPROM: u8 = 0x44;
}

/// Append the additive checksum to a 3-byte command.
#[must_use]
pub const fn frame(command: [u8; 3]) -> [u8; 4] {
    let sum = command[0].wrapping_add(command[1]).wrapping_add(command[2]);
    [command[0], command[1], command[2], sum]
}

fn pulse_reset<RST: OutputPin, D: DelayNs>(reset: &mut RST, delay: &mut D) -> Result<()> {
    reset.set_low().map_err(Error::gpio)?;
    delay.delay_us(URM37_RESET_PULSE_US);
    reset.set_high().map_err(Error::gpio)?;
    delay.delay_ms(URM37_RESET_SETTLE_MS);
    Ok(())
}

/// URM37 in UART mode
pub struct Urm37<U, RST, D> {
    uart: U,
    reset: RST,
    delay: D,
}

impl<U, RST, D> Urm37<U, RST, D>
where
    U: Read + Write + ReadReady,
    RST: OutputPin,
    D: DelayNs,
{
    /// Take the port and reset line, then reset the module.
    ///
    /// The port must already be configured for 9600 baud, 8N1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the reset line cannot be driven.
    pub fn new(uart: U, reset: RST, delay: D) -> Result<Self> {
        let mut dev = Self { uart, reset, delay };
        dev.reset()?;
        Ok(dev)
    }

    /// Pulse the reset line and wait for the module to boot
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the reset line cannot be driven.
    pub fn reset(&mut self) -> Result<()> {
        pulse_reset(&mut self.reset, &mut self.delay)
    }

    /// Send a command and return the verified 4-byte answer.
    ///
    /// A missing, short or corrupt answer is retried up to 10 times.
    ///
    /// # Errors
    ///
    /// [`Error::Uart`] on a port failure (not retried). After the last
    /// attempt, [`Error::Checksum`] if the final answer was corrupt,
    /// [`Error::Timeout`] otherwise.
    pub fn send_command(&mut self, command: [u8; 3]) -> Result<[u8; 4]> {
        let request = frame(command);
        let mut last = Error::Timeout {
            waited_us: URM37_WAIT_TIMEOUT_MS * 1_000,
        };

        for attempt in 1..=URM37_MAX_RETRIES {
            self.uart.write_all(&request).map_err(Error::uart)?;
            self.uart.flush().map_err(Error::uart)?;

            let mut answer = [0u8; 4];
            let received = self.receive(&mut answer)?;
            if received != answer.len() {
                trace!("urm37 attempt {}: {} bytes", attempt, received);
                last = Error::Timeout {
                    waited_us: URM37_WAIT_TIMEOUT_MS * 1_000,
                };
                continue;
            }

            let expected = frame([answer[0], answer[1], answer[2]])[3];
            if answer[3] != expected {
                warn!("urm37 attempt {}: checksum {} != {}", attempt, answer[3], expected);
                last = Error::Checksum {
                    expected: u16::from(expected),
                    actual: u16::from(answer[3]),
                };
                continue;
            }

            return Ok(answer);
        }

        warn!("urm37 command {:#x} failed: {}", command[0], last);
        Err(last)
    }

    /// Distance in cm with the sensor head at `degrees` (0..=276, 6° steps)
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for an angle past the servo range, otherwise
    /// same as [`Urm37::send_command`].
    pub fn distance(&mut self, degrees: u16) -> Result<f32> {
        let index = degrees / 6;
        if index > u16::from(URM37_MAX_DEGREE_INDEX) {
            return Err(Error::OutOfRange("urm37 angle"));
        }
        let answer = self.send_command([cmd::DISTANCE, index as u8, 0])?;
        Ok(f32::from(u16::from_be_bytes([answer[1], answer[2]])))
    }

    /// Module temperature in °C
    ///
    /// # Errors
    ///
    /// Same as [`Urm37::send_command`].
    pub fn temperature(&mut self) -> Result<f32> {
        let answer = self.send_command([cmd::TEMPERATURE, 0, 0])?;
        let (high, low) = (answer[1], answer[2]);
        let magnitude = f32::from(u16::from(high & 0x0F) * 256 + u16::from(low)) / 10.0;
        Ok(if high & 0xF0 != 0 { -magnitude } else { magnitude })
    }

    /// Read one EEPROM byte (addresses 0x00..=0x04)
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a reserved address, otherwise same as
    /// [`Urm37::send_command`].
    pub fn read_eeprom(&mut self, addr: u8) -> Result<u8> {
        check_eeprom_addr(addr)?;
        let answer = self.send_command([cmd::READ_EEPROM, addr, 0])?;
        Ok(answer[2])
    }

    /// Write one EEPROM byte (addresses 0x00..=0x04)
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a reserved address, otherwise same as
    /// [`Urm37::send_command`].
    pub fn write_eeprom(&mut self, addr: u8, value: u8) -> Result<()> {
        check_eeprom_addr(addr)?;
        self.send_command([cmd::WRITE_EEPROM, addr, value]).map(|_| ())
    }

    /// Give the port, reset line and delay back
    pub fn release(self) -> (U, RST, D) {
        (self.uart, self.reset, self.delay)
    }

    /// Collect up to `buf.len()` bytes within the answer window.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut received = 0;
        let mut waited_ms = 0;
        while received < buf.len() {
            if self.uart.read_ready().map_err(Error::uart)? {
                let n = self.uart.read(&mut buf[received..]).map_err(Error::uart)?;
                if n == 0 {
                    break;
                }
                received += n;
            } else if waited_ms >= URM37_WAIT_TIMEOUT_MS {
                break;
            } else {
                self.delay.delay_ms(1);
                waited_ms += 1;
            }
        }
        Ok(received)
    }
}

fn check_eeprom_addr(addr: u8) -> Result<()> {
    if addr > URM37_MAX_EEPROM_ADDR {
        Err(Error::OutOfRange("urm37 eeprom address"))
    } else {
        Ok(())
    }
}

impl<U, RST, D> DistanceSensor for Urm37<U, RST, D>
where
    U: Read + Write + ReadReady,
    RST: OutputPin,
    D: DelayNs,
{
    fn distance_cm(&mut self) -> Result<f32> {
        self.distance(0)
    }
}

impl<U, RST, D> TemperatureSensor for Urm37<U, RST, D>
where
    U: Read + Write + ReadReady,
    RST: OutputPin,
    D: DelayNs,
{
    fn temperature_celsius(&mut self) -> Result<f32> {
        self.temperature()
    }
}

/// URM37 in analog mode
pub struct Urm37Analog<A, TRIG, RST, D> {
    adc: A,
    trigger: TRIG,
    reset: RST,
    delay: D,
    aref: f32,
}

impl<A, TRIG, RST, D> Urm37Analog<A, TRIG, RST, D>
where
    A: AnalogInput,
    TRIG: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Take the analog channel and both lines, then reset the module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if a line cannot be driven.
    pub fn new(adc: A, mut trigger: TRIG, reset: RST, delay: D, aref: f32) -> Result<Self> {
        trigger.set_high().map_err(Error::gpio)?;
        let mut dev = Self {
            adc,
            trigger,
            reset,
            delay,
            aref,
        };
        dev.reset()?;
        Ok(dev)
    }

    /// Pulse the reset line and wait for the module to boot
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the reset line cannot be driven.
    pub fn reset(&mut self) -> Result<()> {
        pulse_reset(&mut self.reset, &mut self.delay)
    }

    /// Trigger a measurement and convert the sampled voltage to cm
    ///
    /// # Errors
    ///
    /// [`Error::Gpio`] on a trigger failure, or the analog read error.
    /// The trigger line is released even when the sample fails.
    pub fn distance(&mut self) -> Result<f32> {
        self.trigger.set_low().map_err(Error::gpio)?;
        let sample = self.adc.read();
        self.trigger.set_high().map_err(Error::gpio)?;

        let millivolts = sample?.volts(self.aref) * 1000.0;
        Ok(millivolts / URM37_MV_PER_CM)
    }

    /// Analog reference voltage
    #[must_use]
    pub const fn aref(&self) -> f32 {
        self.aref
    }

    /// Give the channel, lines and delay back
    pub fn release(self) -> (A, TRIG, RST, D) {
        (self.adc, self.trigger, self.reset, self.delay)
    }
}

impl<A, TRIG, RST, D> DistanceSensor for Urm37Analog<A, TRIG, RST, D>
where
    A: AnalogInput,
    TRIG: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    fn distance_cm(&mut self) -> Result<f32> {
        self.distance()
    }
}
