//! DFRobot Analog EC Meter
//!
//! Conductivity probe with an analog front end. A measurement averages
//! several samples, compensates the probe voltage to 25 °C, and maps it to
//! µS/cm through three linear segments taken from the vendor calibration.
//!
//! The probe needs the solution temperature. Pass it directly to
//! [`DfrobotEc::update`], or let [`DfrobotEc::update_from`] read it from any
//! [`TemperatureSensor`].

use embedded_hal::delay::DelayNs;

use crate::capability::{EcSensor, TemperatureSensor};
use crate::config::{DEFAULT_AREF, EC_SAMPLES, EC_SAMPLE_DELAY_MS, EC_TEMP_COEFFICIENT};
use crate::error::{Error, Result};
use crate::hal::adc::{average_raw, AnalogInput};
use crate::types::Calibration;

/// One linear calibration segment, used up to `threshold` mV
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Upper bound of the compensated voltage, in mV
    pub threshold: f32,
    /// µS/cm per mV
    pub scale: f32,
    /// µS/cm
    pub offset: f32,
}

/// Piecewise calibration of the compensated probe voltage
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EcThresholds {
    /// Below this the probe is out of solution (mV)
    pub min: f32,
    /// Above this the reading is out of range (mV)
    pub max: f32,
    /// First segment
    pub low: Segment,
    /// Second segment
    pub mid: Segment,
    /// Everything above `mid.threshold` (the threshold is unused)
    pub high: Segment,
}

impl Default for EcThresholds {
    fn default() -> Self {
        Self {
            min: 150.0,
            max: 3300.0,
            low: Segment {
                threshold: 448.0,
                scale: 6.84,
                offset: -64.32,
            },
            mid: Segment {
                threshold: 1457.0,
                scale: 6.98,
                offset: -127.0,
            },
            high: Segment {
                threshold: f32::INFINITY,
                scale: 5.3,
                offset: 2278.0,
            },
        }
    }
}

impl EcThresholds {
    /// Map a temperature-compensated voltage (mV) to mS/cm.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] below `min` (probe not in solution) or above
    /// `max`.
    pub fn conductivity(&self, millivolts: f32) -> Result<f32> {
        if millivolts < self.min {
            return Err(Error::OutOfRange("ec probe not in solution"));
        }
        if millivolts > self.max {
            return Err(Error::OutOfRange("ec probe voltage"));
        }

        let segment = if millivolts <= self.low.threshold {
            self.low
        } else if millivolts <= self.mid.threshold {
            self.mid
        } else {
            self.high
        };
        Ok((segment.scale * millivolts + segment.offset) / 1000.0)
    }
}

/// Temperature compensation factor relative to 25 °C
#[must_use]
pub fn compensation(temperature_c: f32) -> f32 {
    1.0 + EC_TEMP_COEFFICIENT * (temperature_c - 25.0)
}

/// DFRobot EC driver
pub struct DfrobotEc<A, D> {
    adc: A,
    delay: D,
    aref: f32,
    calibration: Calibration,
    thresholds: EcThresholds,
    temperature: f32,
    normalized: f32,
    volts: f32,
    ec: f32,
}

impl<A: AnalogInput, D: DelayNs> DfrobotEc<A, D> {
    /// Probe on the default 5 V reference
    #[must_use]
    pub fn new(adc: A, delay: D) -> Self {
        Self::with_aref(adc, delay, DEFAULT_AREF)
    }

    /// Probe with an explicit reference voltage
    #[must_use]
    pub fn with_aref(adc: A, delay: D, aref: f32) -> Self {
        Self {
            adc,
            delay,
            aref,
            calibration: Calibration::IDENTITY,
            thresholds: EcThresholds::default(),
            temperature: 25.0,
            normalized: 0.0,
            volts: 0.0,
            ec: 0.0,
        }
    }

    /// Measure at the given solution temperature and return the
    /// calibrated EC in mS/cm.
    ///
    /// # Errors
    ///
    /// The analog read error, or [`Error::OutOfRange`] when the probe is
    /// out of solution, over range, or the temperature leaves nothing to
    /// compensate against. A reading outside the window still records the
    /// new voltage and zeroes the EC. [`Error::InvalidArgument`] for a
    /// channel reporting zero resolution bits.
    pub fn update(&mut self, temperature_c: f32) -> Result<f32> {
        let factor = compensation(temperature_c);
        if factor <= 0.0 {
            return Err(Error::OutOfRange("ec compensation temperature"));
        }

        let max_count = crate::hal::adc::max_count(self.adc.resolution_bits());
        if max_count == 0 {
            return Err(Error::InvalidArgument("ec probe channel has no resolution"));
        }
        let average = average_raw(&mut self.adc, &mut self.delay, EC_SAMPLES, EC_SAMPLE_DELAY_MS * 1_000)?;

        self.temperature = temperature_c;
        self.normalized = average / f32::from(max_count);
        self.volts = self.normalized * self.aref;

        let compensated = self.volts * 1000.0 / factor;
        trace!("ec probe {} mV compensated at {} C", compensated, temperature_c);
        match self.thresholds.conductivity(compensated) {
            Ok(ec) => {
                self.ec = ec;
                Ok(self.calibrated_ec())
            }
            Err(e) => {
                self.ec = 0.0;
                Err(e)
            }
        }
    }

    /// Read the solution temperature from `sensor`, then [`DfrobotEc::update`].
    ///
    /// # Errors
    ///
    /// The temperature sensor error, or any [`DfrobotEc::update`] error.
    pub fn update_from(&mut self, sensor: &mut dyn TemperatureSensor) -> Result<f32> {
        let temperature = sensor.temperature_celsius()?;
        self.update(temperature)
    }

    /// Calibrated EC of the last update, in mS/cm
    #[must_use]
    pub fn calibrated_ec(&self) -> f32 {
        self.ec * self.calibration.scale + self.calibration.offset * self.calibration.scale
    }

    /// Averaged probe voltage of the last update
    #[must_use]
    pub const fn volts(&self) -> f32 {
        self.volts
    }

    /// Averaged reading of the last update as a fraction of full scale
    #[must_use]
    pub const fn normalized(&self) -> f32 {
        self.normalized
    }

    /// Solution temperature used by the last update
    #[must_use]
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Set the calibration multiplier
    pub fn set_scale(&mut self, scale: f32) {
        self.calibration.scale = scale;
    }

    /// Set the calibration offset (mS/cm, scaled with the reading)
    pub fn set_offset(&mut self, offset: f32) {
        self.calibration.offset = offset;
    }

    /// Set the in-solution and over-range bounds (mV)
    pub fn set_threshold_min_max(&mut self, min: f32, max: f32) {
        self.thresholds.min = min;
        self.thresholds.max = max;
    }

    /// Replace the first segment
    pub fn set_threshold_1(&mut self, threshold: f32, scale: f32, offset: f32) {
        self.thresholds.low = Segment {
            threshold,
            scale,
            offset,
        };
    }

    /// Replace the second segment
    pub fn set_threshold_2(&mut self, threshold: f32, scale: f32, offset: f32) {
        self.thresholds.mid = Segment {
            threshold,
            scale,
            offset,
        };
    }

    /// Replace the open-ended top segment
    pub fn set_threshold_3(&mut self, scale: f32, offset: f32) {
        self.thresholds.high.scale = scale;
        self.thresholds.high.offset = offset;
    }

    /// Current calibration segments
    #[must_use]
    pub const fn thresholds(&self) -> EcThresholds {
        self.thresholds
    }

    /// Give the analog channel and delay back
    pub fn release(self) -> (A, D) {
        (self.adc, self.delay)
    }
}

impl<A: AnalogInput, D: DelayNs> EcSensor for DfrobotEc<A, D> {
    /// Measure again at the last known temperature
    fn ec(&mut self) -> Result<f32> {
        let temperature = self.temperature;
        self.update(temperature)
    }
}
