//! Peripheral Drivers
//!
//! One module per device. Each driver owns the bus or pin objects it is
//! built from and hands them back from `release`.

pub mod adc121c021;
pub mod am2315;
pub mod analog;
pub mod ec;
pub mod hlg150h;
pub mod hx711;
pub mod isd1820;
pub mod max31855;
pub mod my9221;
pub mod o2;
pub mod servo;
pub mod sx6119;
pub mod thermistor;
pub mod urm37;
pub mod water;
