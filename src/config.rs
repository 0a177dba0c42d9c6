//! Device constants and protocol timing
//!
//! Default addresses, reference voltages, calibration constants and delays
//! for every supported device are centralized here. Per-instance values
//! (scale, offset, reference) can be changed at runtime through the
//! driver setters.

// ============================================================================
// Handle layer
// ============================================================================

/// Maximum number of resources a [`crate::hal::registry::ResourceRegistry`]
/// can track at once
pub const MAX_CLAIMED_RESOURCES: usize = 32;

/// Half period of a software-generated clock, in nanoseconds
pub const BITBANG_HALF_PERIOD_NS: u32 = 1_000;

/// Default bound on a ready-line wait (1 s)
pub const DEFAULT_READY_TIMEOUT_US: u32 = 1_000_000;

/// Default interval between two polls of a ready line
pub const DEFAULT_READY_POLL_US: u32 = 10;

/// Analog reference of the usual 5 V SBC analog header
pub const DEFAULT_AREF: f32 = 5.0;

// ============================================================================
// HX711 load-cell ADC
// ============================================================================

/// Data bits per conversion
pub const HX711_DATA_BITS: u8 = 24;

/// Mask applied to move the sign bit of a 24-bit conversion
pub const HX711_SIGN_FLIP: u32 = 0x80_0000;

/// Clock held high for at least this long enters power down
pub const HX711_POWER_DOWN_US: u32 = 60;

// ============================================================================
// MAX31855 thermocouple converter
// ============================================================================

/// Thermocouple temperature resolution (°C per LSB of the 14-bit field)
pub const MAX31855_TC_LSB_C: f32 = 0.25;

/// Cold-junction temperature resolution (°C per LSB of the 12-bit field)
pub const MAX31855_CJ_LSB_C: f32 = 0.0625;

// ============================================================================
// AM2315 humidity/temperature sensor
// ============================================================================

/// `AM2315` I2C address
pub const AM2315_I2C_ADDR: u8 = 0x5C;

/// Wake-up write attempts before giving up
pub const AM2315_WAKE_RETRIES: u8 = 5;

/// Delay between two wake-up attempts
pub const AM2315_WAKE_RETRY_US: u32 = 800;

/// Delay between a request and reading the answer
pub const AM2315_RESPONSE_DELAY_MS: u32 = 5;

// ============================================================================
// ADC121C021 I2C converter
// ============================================================================

/// `ADC121C021` default I2C address
pub const ADC121C021_I2C_ADDR: u8 = 0x55;

/// Converter resolution in bits
pub const ADC121C021_BITS: u8 = 12;

/// Reference voltage on the Grove I2C ADC board
pub const ADC121C021_DEFAULT_VREF: f32 = 3.0;

// ============================================================================
// URM37 ultrasonic ranger
// ============================================================================

/// UART command attempts before giving up
pub const URM37_MAX_RETRIES: u8 = 10;

/// How long to wait for a UART answer
pub const URM37_WAIT_TIMEOUT_MS: u32 = 1_000;

/// Reset pulse width
pub const URM37_RESET_PULSE_US: u32 = 100;

/// Settle time after a reset
pub const URM37_RESET_SETTLE_MS: u32 = 3_000;

/// Analog output sensitivity (mV per cm)
pub const URM37_MV_PER_CM: f32 = 6.8;

/// Highest EEPROM address a host may access
pub const URM37_MAX_EEPROM_ADDR: u8 = 0x04;

/// Largest servo position index (degrees / 6)
pub const URM37_MAX_DEGREE_INDEX: u8 = 46;

// ============================================================================
// Analog sensors
// ============================================================================

/// Grove O2 board reference voltage
pub const GROVE_O2_AREF: f32 = 3.3;

/// Grove temperature thermistor B constant
pub const THERMISTOR_B: f32 = 3975.0;

/// Grove temperature thermistor resistance at 25 °C (ohms)
pub const THERMISTOR_R0: f32 = 10_000.0;

/// DFRobot EC: samples averaged per update
pub const EC_SAMPLES: u16 = 10;

/// DFRobot EC: delay between averaged samples
pub const EC_SAMPLE_DELAY_MS: u32 = 20;

/// DFRobot EC: temperature compensation coefficient (per °C from 25 °C)
pub const EC_TEMP_COEFFICIENT: f32 = 0.0185;

// ============================================================================
// Actuators
// ============================================================================

/// SX6119 control pulse length
pub const SX6119_PULSE_MS: u32 = 100;

/// MY9221 LEDs per driver chip
pub const MY9221_LEDS_PER_CHIP: usize = 12;

/// MY9221 chips that can be chained on one data line
pub const MY9221_MAX_CHIPS: usize = 4;

/// MY9221 latch setup time
pub const MY9221_LATCH_SETUP_US: u32 = 220;

/// MY9221 latch hold time
pub const MY9221_LATCH_HOLD_US: u32 = 1;
