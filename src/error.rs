//! Error types shared by every driver.
//!
//! All fallible operations return [`Result`]. Bus failures are normalised
//! to the `ErrorKind` of the resource that failed, so a driver's error type
//! does not depend on the platform HAL it runs on.

use embedded_hal::{digital, i2c, pwm, spi};

use crate::hal::registry::Resource;

/// Result type alias for driver operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while talking to a peripheral.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The resource is already owned by another handle.
    #[error("resource {0:?} is already claimed")]
    ResourceBusy(Resource),

    /// The resource registry has no room for another claim.
    #[error("resource registry is full")]
    RegistryFull,

    /// A GPIO read or write failed.
    #[error("gpio error: {0:?}")]
    Gpio(digital::ErrorKind),

    /// An I2C transaction failed.
    #[error("i2c error: {0:?}")]
    I2c(i2c::ErrorKind),

    /// An SPI transaction failed.
    #[error("spi error: {0:?}")]
    Spi(spi::ErrorKind),

    /// A PWM duty cycle update failed.
    #[error("pwm error: {0:?}")]
    Pwm(pwm::ErrorKind),

    /// A UART read or write failed.
    #[error("uart error: {0:?}")]
    Uart(embedded_io::ErrorKind),

    /// The analog input could not be sampled.
    #[error("analog read failed")]
    Analog,

    /// The device did not become ready in time.
    #[error("device not ready after {waited_us} us")]
    Timeout {
        /// Time spent waiting, in microseconds
        waited_us: u32,
    },

    /// A frame failed its checksum or CRC.
    #[error("checksum mismatch: expected {expected:#06x}, got {actual:#06x}")]
    Checksum {
        /// Checksum computed over the received data
        expected: u16,
        /// Checksum carried in the frame
        actual: u16,
    },

    /// The device answered with a frame that does not match the request.
    #[error("unexpected response from device")]
    Protocol,

    /// The thermocouple converter reported a fault.
    #[error("thermocouple fault: {0:?}")]
    Thermocouple(ThermocoupleFault),

    /// A measured or requested value is outside the valid range.
    #[error("{0} out of range")]
    OutOfRange(&'static str),

    /// An argument was rejected before touching the hardware.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    /// Wrap a GPIO error.
    pub fn gpio<E: digital::Error>(err: E) -> Self {
        Self::Gpio(err.kind())
    }

    /// Wrap an I2C error.
    pub fn i2c<E: i2c::Error>(err: E) -> Self {
        Self::I2c(err.kind())
    }

    /// Wrap an SPI error.
    pub fn spi<E: spi::Error>(err: E) -> Self {
        Self::Spi(err.kind())
    }

    /// Wrap a PWM error.
    pub fn pwm<E: pwm::Error>(err: E) -> Self {
        Self::Pwm(err.kind())
    }

    /// Wrap a UART error.
    pub fn uart<E: embedded_io::Error>(err: E) -> Self {
        Self::Uart(err.kind())
    }
}

/// Fault bits reported by a thermocouple converter (MAX31855 D0..D2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermocoupleFault(u8);

impl ThermocoupleFault {
    const OPEN_CIRCUIT: u8 = 0x01;
    const SHORT_TO_GND: u8 = 0x02;
    const SHORT_TO_VCC: u8 = 0x04;

    /// Build from the three low bits of a frame.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// Raw fault bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Thermocouple is not connected.
    #[must_use]
    pub const fn open_circuit(self) -> bool {
        self.0 & Self::OPEN_CIRCUIT != 0
    }

    /// Thermocouple is shorted to ground.
    #[must_use]
    pub const fn short_to_ground(self) -> bool {
        self.0 & Self::SHORT_TO_GND != 0
    }

    /// Thermocouple is shorted to VCC.
    #[must_use]
    pub const fn short_to_vcc(self) -> bool {
        self.0 & Self::SHORT_TO_VCC != 0
    }
}
