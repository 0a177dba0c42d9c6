//! MAX31855 Thermocouple Tests
//!
//! Frame decoding, fault reporting and the SPI read path.
//!
//! Run with: cargo test --features std --test thermocouple_tests

mod common;

use common::MockSpi;
use rstest::rstest;
use sbc_drivers::capability::TemperatureSensor;
use sbc_drivers::drivers::max31855::{decode, Max31855};
use sbc_drivers::error::ThermocoupleFault;
use sbc_drivers::types::TemperatureUnit;
use sbc_drivers::Error;

/// Build a fault-free frame from quarter-degree and sixteenth-degree counts
fn frame(tc_quarters: i32, cj_sixteenths: i32) -> u32 {
    let tc = ((tc_quarters as u32) & 0x3FFF) << 18;
    let cj = ((cj_sixteenths as u32) & 0x0FFF) << 4;
    tc | cj
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn test_zero_bytes_decode_to_zero() {
    let mut tc = Max31855::new(MockSpi::with_frames(&[0x0000_0000]));
    assert_eq!(tc.temperature().unwrap(), 0.0);
}

#[rstest]
#[case(100, 25.0)]
#[case(-1, -0.25)]
#[case(1600, 400.0)]
#[case(-1080, -270.0)]
fn test_thermocouple_temperature(#[case] quarters: i32, #[case] expected: f32) {
    let reading = decode(frame(quarters, 0)).unwrap();
    assert_eq!(reading.thermocouple_c, expected);
}

#[rstest]
#[case(400, 25.0)]
#[case(-16, -1.0)]
#[case(1, 0.0625)]
fn test_internal_temperature(#[case] sixteenths: i32, #[case] expected: f32) {
    let reading = decode(frame(0, sixteenths)).unwrap();
    assert_eq!(reading.internal_c, expected);
}

// ============================================================================
// Faults
// ============================================================================

#[rstest]
#[case(0x01, true, false, false)]
#[case(0x02, false, true, false)]
#[case(0x04, false, false, true)]
fn test_fault_bits_are_surfaced(#[case] bits: u32, #[case] open: bool, #[case] gnd: bool, #[case] vcc: bool) {
    // Temperature field set so a silent decode would return a plausible value
    let raw = frame(100, 400) | 0x0001_0000 | bits;

    match decode(raw) {
        Err(Error::Thermocouple(fault)) => {
            assert_eq!(fault.open_circuit(), open);
            assert_eq!(fault.short_to_ground(), gnd);
            assert_eq!(fault.short_to_vcc(), vcc);
        }
        other => panic!("expected a thermocouple fault, got {other:?}"),
    }
}

#[test]
fn test_driver_reports_fault_instead_of_value() {
    let mut tc = Max31855::new(MockSpi::with_frames(&[frame(100, 0) | 0x0001_0001]));
    assert_eq!(
        tc.temperature(),
        Err(Error::Thermocouple(ThermocoupleFault::from_bits(0x01)))
    );
}

#[test]
fn test_spi_failure() {
    let mut tc = Max31855::new(MockSpi::failing());
    assert!(matches!(tc.read_frame(), Err(Error::Spi(_))));
}

// ============================================================================
// Driver
// ============================================================================

#[test]
fn test_read_frame_is_big_endian() {
    let mut tc = Max31855::new(MockSpi::with_frames(&[0x1234_5678]));
    assert_eq!(tc.read_frame().unwrap(), 0x1234_5678);
}

#[test]
fn test_each_getter_takes_a_fresh_frame() {
    let mut tc = Max31855::new(MockSpi::with_frames(&[frame(100, 0), frame(0, 400)]));
    assert_eq!(tc.temperature().unwrap(), 25.0);
    assert_eq!(tc.internal_temperature().unwrap(), 25.0);
}

#[test]
fn test_temperature_sensor_units() {
    let mut tc = Max31855::new(MockSpi::with_frames(&[frame(400, 0)]));
    let sensor: &mut dyn TemperatureSensor = &mut tc;

    let fahrenheit = sensor.temperature(TemperatureUnit::Fahrenheit).unwrap();
    assert!((fahrenheit - 212.0).abs() < 1e-3);
}
