//! Analog Sensor Tests
//!
//! Count-to-volts conversion, averaging, and the drivers built on a single
//! analog channel: generic calibrated sensor, O2, thermistor and EC probe.
//!
//! Run with: cargo test --features std --test analog_tests

mod common;

use common::{MockAdc, MockDelay};
use rstest::rstest;
use sbc_drivers::capability::{EcSensor, TemperatureSensor};
use sbc_drivers::drivers::analog::AnalogSensor;
use sbc_drivers::drivers::ec::{compensation, DfrobotEc, EcThresholds};
use sbc_drivers::drivers::o2::GroveO2;
use sbc_drivers::drivers::thermistor::{counts_to_celsius, GroveTemperature};
use sbc_drivers::hal::adc::{average_raw, max_count, AdcReading};
use sbc_drivers::types::TemperatureUnit;
use sbc_drivers::{Error, Result};

/// Temperature source with a fixed answer
struct FixedTemperature(Result<f32>);

impl TemperatureSensor for FixedTemperature {
    fn temperature_celsius(&mut self) -> Result<f32> {
        self.0
    }
}

fn probe_millivolts(raw: u16) -> f32 {
    f32::from(raw) / 1023.0 * 5.0 * 1000.0
}

// ============================================================================
// Readings
// ============================================================================

#[rstest]
#[case(10, 1023)]
#[case(12, 4095)]
#[case(16, 65535)]
fn test_max_count(#[case] bits: u8, #[case] expected: u16) {
    assert_eq!(max_count(bits), expected);
}

#[test]
fn test_reading_conversions() {
    let reading = AdcReading::new(1023, 10);
    assert_eq!(reading.normalized(), 1.0);
    assert!((reading.volts(5.0) - 5.0).abs() < 1e-6);

    let zero = AdcReading::new(0, 10);
    assert_eq!(zero.normalized(), 0.0);
    assert_eq!(zero.volts(3.3), 0.0);
}

#[test]
fn test_reading_without_resolution_is_zero() {
    let reading = AdcReading::new(5, 0);
    assert_eq!(reading.max_count(), 0);
    assert_eq!(reading.normalized(), 0.0);
    assert_eq!(reading.volts(5.0), 0.0);
}

#[test]
fn test_average_raw_waits_between_samples() {
    let mut adc = MockAdc::sequence(10, &[10, 20, 30]);
    let mut delay = MockDelay::new();

    let mean = average_raw(&mut adc, &mut delay, 3, 1_000).unwrap();
    assert_eq!(mean, 20.0);
    assert_eq!(delay.elapsed_us(), 3_000);
}

#[test]
fn test_average_raw_propagates_failure() {
    let mut adc = MockAdc::sequence(10, &[10, 20]);
    let mut delay = MockDelay::new();

    assert_eq!(average_raw(&mut adc, &mut delay, 3, 0), Err(Error::Analog));
}

// ============================================================================
// Generic analog sensor
// ============================================================================

#[test]
fn test_analog_sensor_defaults() {
    let mut sensor = AnalogSensor::new(MockAdc::constant(10, 1023));

    assert_eq!(sensor.aref(), 5.0);
    assert_eq!(sensor.raw_counts().unwrap(), 1023);
    assert_eq!(sensor.normalized().unwrap(), 1.0);
    assert!((sensor.volts().unwrap() - 5.0).abs() < 1e-6);
    assert!((sensor.value().unwrap() - 5.0).abs() < 1e-6);
}

#[test]
fn test_analog_sensor_calibration() {
    let mut sensor = AnalogSensor::with_aref(MockAdc::constant(10, 1023), 3.3);
    sensor.set_scale(2.0);
    sensor.set_offset(-1.0);

    assert_eq!(sensor.scale(), 2.0);
    assert_eq!(sensor.offset(), -1.0);
    assert!((sensor.value().unwrap() - 5.6).abs() < 1e-5);

    sensor.set_aref(5.0);
    assert!((sensor.value().unwrap() - 9.0).abs() < 1e-5);
}

#[test]
fn test_analog_sensor_failed_read_is_an_error() {
    let mut sensor = AnalogSensor::new(MockAdc::failing(10));

    assert_eq!(sensor.raw_counts(), Err(Error::Analog));
    assert_eq!(sensor.value(), Err(Error::Analog));
}

// ============================================================================
// Grove O2
// ============================================================================

#[test]
fn test_o2_concentration() {
    let mut sensor = GroveO2::new(MockAdc::constant(10, 620));

    let volts = 620.0 / 1023.0 * 3.3;
    assert!((sensor.volts().unwrap() - volts).abs() < 1e-5);
    assert!((sensor.concentration().unwrap() - volts * 0.21 / 2.0 * 100.0).abs() < 1e-4);
}

// ============================================================================
// Thermistor
// ============================================================================

#[test]
fn test_thermistor_mid_scale_is_room_temperature() {
    let celsius = counts_to_celsius(512, 1023).unwrap();
    assert!((celsius - 25.0).abs() < 0.1, "got {celsius}");
}

#[test]
fn test_thermistor_rises_with_count() {
    let cold = counts_to_celsius(300, 1023).unwrap();
    let warm = counts_to_celsius(700, 1023).unwrap();
    assert!(cold < 25.0);
    assert!(warm > 25.0);
}

#[rstest]
#[case(0)]
#[case(1023)]
fn test_thermistor_rails_are_out_of_range(#[case] raw: u16) {
    assert!(matches!(counts_to_celsius(raw, 1023), Err(Error::OutOfRange(_))));
}

#[test]
fn test_grove_temperature_calibration_and_units() {
    let mut sensor = GroveTemperature::new(MockAdc::constant(10, 512));
    sensor.set_offset(1.0);
    assert_eq!(sensor.calibration().offset, 1.0);

    let celsius = sensor.temperature().unwrap();
    assert!((celsius - 26.0).abs() < 0.1);

    let kelvin = TemperatureSensor::temperature(&mut sensor, TemperatureUnit::Kelvin).unwrap();
    assert!((kelvin - (celsius + 273.15)).abs() < 1e-3);
}

// ============================================================================
// DFRobot EC
// ============================================================================

#[test]
fn test_compensation_is_one_at_25c() {
    assert_eq!(compensation(25.0), 1.0);
    assert!((compensation(35.0) - 1.185).abs() < 1e-6);
}

#[rstest]
#[case(300.0, (6.84 * 300.0 - 64.32) / 1000.0)]
#[case(1000.0, (6.98 * 1000.0 - 127.0) / 1000.0)]
#[case(2000.0, (5.3 * 2000.0 + 2278.0) / 1000.0)]
fn test_segments(#[case] millivolts: f32, #[case] expected: f32) {
    let ec = EcThresholds::default().conductivity(millivolts).unwrap();
    assert!((ec - expected).abs() < 1e-5);
}

#[rstest]
#[case(100.0)]
#[case(3400.0)]
fn test_outside_window_is_out_of_range(#[case] millivolts: f32) {
    assert!(matches!(
        EcThresholds::default().conductivity(millivolts),
        Err(Error::OutOfRange(_))
    ));
}

#[test]
fn test_ec_update_averages_ten_samples() {
    let delay = MockDelay::new();
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 205), delay.clone());

    let ec = probe.update(25.0).unwrap();
    let expected = (6.98 * probe_millivolts(205) - 127.0) / 1000.0;
    assert!((ec - expected).abs() < 1e-4);

    assert_eq!(probe.temperature(), 25.0);
    assert!((probe.volts() - probe_millivolts(205) / 1000.0).abs() < 1e-5);
    assert_eq!(delay.elapsed_ms(), 10 * 20);

    let (adc, _) = probe.release();
    assert_eq!(adc.reads, 10);
}

#[test]
fn test_ec_compensates_for_temperature() {
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 205), MockDelay::new());

    let ec = probe.update(35.0).unwrap();
    let compensated = probe_millivolts(205) / 1.185;
    let expected = (6.98 * compensated - 127.0) / 1000.0;
    assert!((ec - expected).abs() < 1e-4);
}

#[test]
fn test_ec_probe_out_of_solution() {
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 10), MockDelay::new());
    assert!(matches!(probe.update(25.0), Err(Error::OutOfRange(_))));
}

#[test]
fn test_ec_failed_sample_aborts_update() {
    let mut probe = DfrobotEc::new(MockAdc::sequence(10, &[205; 3]), MockDelay::new());
    assert_eq!(probe.update(25.0), Err(Error::Analog));
}

#[test]
fn test_ec_rejects_impossible_temperature() {
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 205), MockDelay::new());
    assert!(matches!(probe.update(-40.0), Err(Error::OutOfRange(_))));
}

#[test]
fn test_ec_update_from_temperature_sensor() {
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 205), MockDelay::new());

    let mut thermometer = FixedTemperature(Ok(35.0));
    probe.update_from(&mut thermometer).unwrap();
    assert_eq!(probe.temperature(), 35.0);

    let mut broken = FixedTemperature(Err(Error::Analog));
    assert_eq!(probe.update_from(&mut broken), Err(Error::Analog));
}

#[test]
fn test_ec_calibration_scales_offset_too() {
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 205), MockDelay::new());
    let raw = probe.update(25.0).unwrap();

    probe.set_scale(2.0);
    probe.set_offset(0.5);
    assert!((probe.calibrated_ec() - (raw * 2.0 + 1.0)).abs() < 1e-5);
}

#[test]
fn test_ec_sensor_reuses_last_temperature() {
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 205), MockDelay::new());
    let first = probe.update(35.0).unwrap();

    let again = EcSensor::ec(&mut probe).unwrap();
    assert_eq!(again, first);
    assert_eq!(probe.temperature(), 35.0);
    assert_eq!(probe.calibrated_ec(), first);
}

#[test]
fn test_ec_failed_update_zeroes_reading() {
    let mut samples = vec![205; 10];
    samples.extend_from_slice(&[10; 10]);
    let mut probe = DfrobotEc::new(MockAdc::sequence(10, &samples), MockDelay::new());

    let first = probe.update(25.0).unwrap();
    assert!(first > 0.0);

    assert!(matches!(probe.update(25.0), Err(Error::OutOfRange(_))));
    assert_eq!(probe.calibrated_ec(), 0.0);
    assert!((probe.volts() - probe_millivolts(10) / 1000.0).abs() < 1e-5);
}

#[test]
fn test_ec_rejects_channel_without_resolution() {
    let mut probe = DfrobotEc::new(MockAdc::constant(0, 0), MockDelay::new());

    assert!(matches!(probe.update(25.0), Err(Error::InvalidArgument(_))));
    assert_eq!(probe.volts(), 0.0);
}

#[test]
fn test_ec_threshold_setters() {
    let mut probe = DfrobotEc::new(MockAdc::constant(10, 205), MockDelay::new());
    probe.set_threshold_min_max(100.0, 4000.0);
    probe.set_threshold_1(500.0, 7.0, -60.0);
    probe.set_threshold_2(1500.0, 7.1, -120.0);
    probe.set_threshold_3(5.0, 2300.0);

    let thresholds = probe.thresholds();
    assert_eq!(thresholds.min, 100.0);
    assert_eq!(thresholds.max, 4000.0);
    assert_eq!(thresholds.low.threshold, 500.0);
    assert_eq!(thresholds.mid.scale, 7.1);
    assert_eq!(thresholds.high.offset, 2300.0);
    assert_eq!(thresholds.high.threshold, f32::INFINITY);
}
