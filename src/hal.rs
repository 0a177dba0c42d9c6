//! Hardware Abstraction Layer
//!
//! Handle layer over the `embedded-hal` traits: resource ownership,
//! pin wrappers, analog input, register access on I2C, PWM duty helpers
//! and bit-banged transfers. Platform HALs provide the trait
//! implementations; nothing here is tied to one board.

pub mod adc;
pub mod bitbang;
pub mod gpio;
pub mod i2c;
pub mod pwm;
pub mod registry;
