//! Peripheral drivers for single-board computers
//!
//! Blocking drivers for sensors and actuators wired to GPIO, analog, I2C,
//! SPI, UART or PWM. Every driver is generic over the `embedded-hal` 1.0
//! (and `embedded-io` for UART) traits, so the same code runs on a Linux
//! SBC through `linux-embedded-hal` or on a microcontroller HAL.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DEVICE DRIVERS                          │
//! │  HX711 │ MAX31855 │ AM2315 │ ADC121C021 │ URM37 │ ...        │
//! ├─────────────────────────────────────────────────────────────┤
//! │              CAPABILITIES / UNIT TRANSFORMS                  │
//! │  TemperatureSensor │ DistanceSensor │ Calibration │ units    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      HANDLE LAYER                            │
//! │  Registry │ GPIO │ Analog │ I2C │ PWM │ Bit-bang             │
//! ├─────────────────────────────────────────────────────────────┤
//! │               embedded-hal / embedded-io traits              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Owned handles**: a driver owns its pins and buses and returns them
//!   from `release`; a [`hal::registry::ResourceRegistry`] rejects a second
//!   claim on the same line
//! - **One error type**: every fallible operation returns [`Result`]; no
//!   sentinel values
//! - **Bounded waits**: ready-line polling times out unless told otherwise
//! - **Pure transforms**: raw-to-physical conversions are plain functions

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

/// Crate error type
pub mod error;

/// Device constants and protocol timing
pub mod config;

/// Units, calibration and raw-to-physical transforms
pub mod types;

/// Capability traits shared across devices
pub mod capability;

/// Cooperative cancellation for sampling loops
pub mod cancel;

/// Hardware Abstraction Layer
///
/// Resource ownership and thin wrappers over the `embedded-hal` traits.
pub mod hal;

/// Peripheral Drivers
///
/// One driver per device.
pub mod drivers;

pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::cancel::{run_sampling, CancellationToken};
    pub use crate::capability::{
        DistanceSensor, EcSensor, HumiditySensor, Switch, TemperatureSensor, VoltageSensor,
    };
    pub use crate::error::{Error, Result};
    pub use crate::hal::adc::{AdcReading, AnalogInput};
    pub use crate::hal::registry::{Resource, ResourceRegistry};
    pub use crate::types::{Calibration, DistanceUnit, TemperatureUnit};

    // Common traits
    pub use embedded_hal::delay::DelayNs;
    pub use embedded_hal::digital::{InputPin, OutputPin};
}
