//! Shared measurement types
//!
//! Units, calibration state and the pure transforms that turn raw counts
//! into physical values. Nothing here touches hardware.

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// Convert a converter count to volts against `aref`.
#[must_use]
pub fn counts_to_volts(raw: u16, max_count: u16, aref: f32) -> f32 {
    if max_count == 0 {
        return 0.0;
    }
    f32::from(raw) * (aref / f32::from(max_count))
}

/// User calibration applied after a raw transform
///
/// `value = x * scale + offset`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Multiplier
    pub scale: f32,
    /// Added after scaling
    pub offset: f32,
}

impl Calibration {
    /// Identity calibration
    pub const IDENTITY: Self = Self::new(1.0, 0.0);

    /// Create a calibration
    #[must_use]
    pub const fn new(scale: f32, offset: f32) -> Self {
        Self { scale, offset }
    }

    /// Apply to a value
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        x * self.scale + self.offset
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Temperature scale
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureUnit {
    /// Degrees Celsius
    #[default]
    Celsius,
    /// Degrees Fahrenheit
    Fahrenheit,
    /// Kelvin
    Kelvin,
}

impl TemperatureUnit {
    /// Convert a Celsius value into this unit
    #[must_use]
    pub fn from_celsius(self, celsius: f32) -> f32 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            Self::Kelvin => celsius + 273.15,
        }
    }

    /// Convert a value in this unit back to Celsius
    #[must_use]
    pub fn to_celsius(self, value: f32) -> f32 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Self::Kelvin => value - 273.15,
        }
    }

    /// Unit symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
            Self::Kelvin => "K",
        }
    }
}

impl TryFrom<char> for TemperatureUnit {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            'C' => Ok(Self::Celsius),
            'F' => Ok(Self::Fahrenheit),
            'K' => Ok(Self::Kelvin),
            _ => Err(Error::InvalidArgument("unknown temperature unit")),
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ if s.trim().eq_ignore_ascii_case("celsius") => Ok(Self::Celsius),
            _ if s.trim().eq_ignore_ascii_case("fahrenheit") => Ok(Self::Fahrenheit),
            _ if s.trim().eq_ignore_ascii_case("kelvin") => Ok(Self::Kelvin),
            _ => Err(Error::InvalidArgument("unknown temperature unit")),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Length unit for distance sensors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceUnit {
    /// Centimeters
    #[default]
    Centimeters,
    /// Inches
    Inches,
}

const CM_PER_INCH: f32 = 2.54;

/// Convert a distance in centimeters to `unit`
#[must_use]
pub fn convert_cm_to(cm: f32, unit: DistanceUnit) -> f32 {
    match unit {
        DistanceUnit::Centimeters => cm,
        DistanceUnit::Inches => cm / CM_PER_INCH,
    }
}

/// Convert a distance in inches to `unit`
#[must_use]
pub fn convert_inch_to(inches: f32, unit: DistanceUnit) -> f32 {
    match unit {
        DistanceUnit::Centimeters => inches * CM_PER_INCH,
        DistanceUnit::Inches => inches,
    }
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "cm" | "CM" | "centimeters" => Ok(Self::Centimeters),
            "in" | "IN" | "inch" | "inches" => Ok(Self::Inches),
            _ => Err(Error::InvalidArgument("unknown distance unit")),
        }
    }
}
