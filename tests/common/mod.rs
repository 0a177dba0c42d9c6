//! Mock hardware shared by the integration tests
//!
//! Every mock implements the real `embedded-hal` / `embedded-io` traits and
//! keeps its state behind `Rc` so a test can hold a probe while the driver
//! owns the device.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal::i2c::{self, I2c, NoAcknowledgeSource};
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_hal::spi::{self, SpiDevice};

use sbc_drivers::hal::adc::AnalogInput;
use sbc_drivers::{Error, Result};

// ============================================================================
// Errors
// ============================================================================

/// Error returned by the failing mocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBusError {
    Nack,
    Other,
}

impl digital::Error for MockBusError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl i2c::Error for MockBusError {
    fn kind(&self) -> i2c::ErrorKind {
        match self {
            Self::Nack => i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Self::Other => i2c::ErrorKind::Other,
        }
    }
}

impl spi::Error for MockBusError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl pwm::Error for MockBusError {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

// ============================================================================
// Delay
// ============================================================================

/// Delay that returns immediately and adds up the requested time
#[derive(Clone, Default)]
pub struct MockDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns.get() / 1_000
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
    }
}

// ============================================================================
// GPIO
// ============================================================================

#[derive(Default)]
struct PinState {
    levels: Vec<bool>,
    inputs: VecDeque<bool>,
    input: bool,
}

/// Pin that records every level driven and replays scripted input levels
#[derive(Clone, Default)]
pub struct MockPin {
    state: Rc<RefCell<PinState>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input pin that reads `level` until told otherwise
    pub fn input(level: bool) -> Self {
        let pin = Self::default();
        pin.set_input(level);
        pin
    }

    pub fn set_input(&self, level: bool) {
        self.state.borrow_mut().input = level;
    }

    /// Levels returned by the next reads, before falling back to the
    /// steady input level
    pub fn queue_inputs(&self, levels: &[bool]) {
        self.state.borrow_mut().inputs.extend(levels.iter().copied());
    }

    /// Every level driven, oldest first
    pub fn history(&self) -> Vec<bool> {
        self.state.borrow().levels.clone()
    }

    /// Last level driven
    pub fn level(&self) -> Option<bool> {
        self.state.borrow().levels.last().copied()
    }

    fn read(&self) -> bool {
        let mut state = self.state.borrow_mut();
        match state.inputs.pop_front() {
            Some(level) => level,
            None => state.input,
        }
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.state.borrow_mut().levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.state.borrow_mut().levels.push(true);
        Ok(())
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.level() == Some(true))
    }

    fn is_set_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.level() != Some(true))
    }
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.read())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.read())
    }
}

/// Pin whose every operation fails
pub struct FailingPin;

impl digital::ErrorType for FailingPin {
    type Error = MockBusError;
}

impl OutputPin for FailingPin {
    fn set_low(&mut self) -> core::result::Result<(), MockBusError> {
        Err(MockBusError::Other)
    }

    fn set_high(&mut self) -> core::result::Result<(), MockBusError> {
        Err(MockBusError::Other)
    }
}

impl InputPin for FailingPin {
    fn is_high(&mut self) -> core::result::Result<bool, MockBusError> {
        Err(MockBusError::Other)
    }

    fn is_low(&mut self) -> core::result::Result<bool, MockBusError> {
        Err(MockBusError::Other)
    }
}

// ============================================================================
// HX711 simulator
// ============================================================================

#[derive(Default)]
struct Hx711State {
    words: VecDeque<u32>,
    clk_high: bool,
    pulses: u32,
    frames: Vec<u32>,
    busy_polls: usize,
}

impl Hx711State {
    fn dout(&mut self) -> bool {
        if self.clk_high {
            // Data bit for the rising edge just clocked
            if (1..=24).contains(&self.pulses) {
                let word = self.words.front().copied().unwrap_or(0);
                return (word >> (24 - self.pulses)) & 1 == 1;
            }
            return false;
        }

        // Clock idle: a ready poll. Close the previous frame first.
        if self.pulses >= 24 {
            self.frames.push(self.pulses);
            self.pulses = 0;
            self.words.pop_front();
        }
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            return true;
        }
        self.words.is_empty()
    }
}

/// HX711 behavioural model: DOUT low while conversions are queued, 24 data
/// bits shifted out MSB first on rising clock edges.
#[derive(Clone, Default)]
pub struct Hx711Sim {
    state: Rc<RefCell<Hx711State>>,
}

impl Hx711Sim {
    /// Device that will deliver `words` (raw 24-bit two's complement)
    pub fn new(words: &[u32]) -> Self {
        let sim = Self::default();
        sim.push(words);
        sim
    }

    pub fn push(&self, words: &[u32]) {
        self.state.borrow_mut().words.extend(words.iter().copied());
    }

    /// Report busy for the next `polls` ready checks
    pub fn busy_for(&self, polls: usize) {
        self.state.borrow_mut().busy_polls = polls;
    }

    pub fn clock(&self) -> Hx711Clock {
        Hx711Clock {
            state: Rc::clone(&self.state),
        }
    }

    pub fn dout(&self) -> Hx711Dout {
        Hx711Dout {
            state: Rc::clone(&self.state),
        }
    }

    /// Clock pulses per frame, including the frame in progress
    pub fn frames(&self) -> Vec<u32> {
        let state = self.state.borrow();
        let mut frames = state.frames.clone();
        if state.pulses > 0 {
            frames.push(state.pulses);
        }
        frames
    }

    pub fn clock_high(&self) -> bool {
        self.state.borrow().clk_high
    }

    pub fn remaining(&self) -> usize {
        self.state.borrow().words.len()
    }
}

pub struct Hx711Clock {
    state: Rc<RefCell<Hx711State>>,
}

impl digital::ErrorType for Hx711Clock {
    type Error = Infallible;
}

impl OutputPin for Hx711Clock {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.state.borrow_mut().clk_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        let mut state = self.state.borrow_mut();
        if !state.clk_high {
            state.pulses += 1;
        }
        state.clk_high = true;
        Ok(())
    }
}

pub struct Hx711Dout {
    state: Rc<RefCell<Hx711State>>,
}

impl digital::ErrorType for Hx711Dout {
    type Error = Infallible;
}

impl InputPin for Hx711Dout {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.state.borrow_mut().dout())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.state.borrow_mut().dout())
    }
}

// ============================================================================
// SPI
// ============================================================================

/// SPI device answering every read with the next queued frame
#[derive(Default)]
pub struct MockSpi {
    frames: VecDeque<[u8; 4]>,
    fail: bool,
}

impl MockSpi {
    pub fn with_frames(frames: &[u32]) -> Self {
        Self {
            frames: frames.iter().map(|f| f.to_be_bytes()).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            frames: VecDeque::new(),
            fail: true,
        }
    }
}

impl spi::ErrorType for MockSpi {
    type Error = MockBusError;
}

impl SpiDevice for MockSpi {
    fn transaction(
        &mut self,
        operations: &mut [spi::Operation<'_, u8>],
    ) -> core::result::Result<(), MockBusError> {
        if self.fail {
            return Err(MockBusError::Other);
        }
        for op in operations.iter_mut() {
            if let spi::Operation::Read(buf) = op {
                let frame = self.frames.pop_front().unwrap_or([0; 4]);
                for (dst, src) in buf.iter_mut().zip(frame.iter()) {
                    *dst = *src;
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// I2C
// ============================================================================

#[derive(Default)]
struct I2cState {
    registers: HashMap<u8, Vec<u8>>,
    pointer: u8,
    reads: VecDeque<Vec<u8>>,
    writes: Vec<(u8, Vec<u8>)>,
    nack_writes: usize,
    present: Vec<u8>,
}

/// I2C bus with a register file and scripted raw answers.
///
/// A write sets the register pointer to its first byte and stores the rest
/// at that register. A read returns the next scripted answer if one is
/// queued, otherwise the bytes stored at the pointer.
#[derive(Clone, Default)]
pub struct MockI2c {
    state: Rc<RefCell<I2cState>>,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only these addresses acknowledge
    pub fn with_devices(addresses: &[u8]) -> Self {
        let bus = Self::default();
        bus.state.borrow_mut().present = addresses.to_vec();
        bus
    }

    pub fn set_register(&self, reg: u8, bytes: &[u8]) {
        self.state.borrow_mut().registers.insert(reg, bytes.to_vec());
    }

    pub fn register(&self, reg: u8) -> Vec<u8> {
        self.state
            .borrow()
            .registers
            .get(&reg)
            .cloned()
            .unwrap_or_default()
    }

    pub fn queue_read(&self, bytes: &[u8]) {
        self.state.borrow_mut().reads.push_back(bytes.to_vec());
    }

    /// NACK the next `count` writes
    pub fn nack_writes(&self, count: usize) {
        self.state.borrow_mut().nack_writes = count;
    }

    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.state.borrow().writes.clone()
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = MockBusError;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> core::result::Result<(), MockBusError> {
        let mut state = self.state.borrow_mut();
        if !state.present.is_empty() && !state.present.contains(&address) {
            return Err(MockBusError::Nack);
        }

        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => {
                    if state.nack_writes > 0 {
                        state.nack_writes -= 1;
                        return Err(MockBusError::Nack);
                    }
                    state.writes.push((address, bytes.to_vec()));
                    if let Some((&reg, data)) = bytes.split_first() {
                        state.pointer = reg;
                        if !data.is_empty() {
                            state.registers.insert(reg, data.to_vec());
                        }
                    }
                }
                i2c::Operation::Read(buf) => {
                    let answer = match state.reads.pop_front() {
                        Some(answer) => answer,
                        None => {
                            let pointer = state.pointer;
                            state.registers.get(&pointer).cloned().unwrap_or_default()
                        }
                    };
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = answer.get(i).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// UART
// ============================================================================

#[derive(Default)]
struct UartState {
    answers: VecDeque<Option<Vec<u8>>>,
    pending: Vec<u8>,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

/// Serial port that answers each 4-byte command with the next scripted
/// answer; `None` stays silent for that command.
#[derive(Clone, Default)]
pub struct MockUart {
    state: Rc<RefCell<UartState>>,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, bytes: &[u8]) {
        self.state.borrow_mut().answers.push_back(Some(bytes.to_vec()));
    }

    pub fn stay_silent(&self) {
        self.state.borrow_mut().answers.push_back(None);
    }

    pub fn sent(&self) -> Vec<u8> {
        self.state.borrow().tx.clone()
    }
}

impl embedded_io::ErrorType for MockUart {
    type Error = Infallible;
}

impl embedded_io::Write for MockUart {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Infallible> {
        let mut state = self.state.borrow_mut();
        state.tx.extend_from_slice(buf);
        state.pending.extend_from_slice(buf);
        while state.pending.len() >= 4 {
            state.pending.drain(..4);
            if let Some(Some(answer)) = state.answers.pop_front() {
                state.rx.extend(answer);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> core::result::Result<(), Infallible> {
        Ok(())
    }
}

impl embedded_io::Read for MockUart {
    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Infallible> {
        let mut state = self.state.borrow_mut();
        let n = buf.len().min(state.rx.len());
        for byte in buf.iter_mut().take(n) {
            *byte = state.rx.pop_front().unwrap_or(0);
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for MockUart {
    fn read_ready(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.state.borrow().rx.is_empty())
    }
}

// ============================================================================
// Analog
// ============================================================================

/// Analog channel returning queued samples, then a steady value
pub struct MockAdc {
    bits: u8,
    samples: VecDeque<u16>,
    steady: Option<u16>,
    pub reads: usize,
}

impl MockAdc {
    /// Channel that always reads `raw`
    pub fn constant(bits: u8, raw: u16) -> Self {
        Self {
            bits,
            samples: VecDeque::new(),
            steady: Some(raw),
            reads: 0,
        }
    }

    /// Channel that reads `samples` in order and then fails
    pub fn sequence(bits: u8, samples: &[u16]) -> Self {
        Self {
            bits,
            samples: samples.iter().copied().collect(),
            steady: None,
            reads: 0,
        }
    }

    /// Channel whose every read fails
    pub fn failing(bits: u8) -> Self {
        Self::sequence(bits, &[])
    }
}

impl AnalogInput for MockAdc {
    fn resolution_bits(&self) -> u8 {
        self.bits
    }

    fn read_raw(&mut self) -> Result<u16> {
        self.reads += 1;
        self.samples
            .pop_front()
            .or(self.steady)
            .ok_or(Error::Analog)
    }
}

// ============================================================================
// PWM
// ============================================================================

/// PWM channel remembering its duty cycle
#[derive(Clone)]
pub struct MockPwm {
    max: u16,
    duty: Rc<Cell<u16>>,
}

impl MockPwm {
    pub fn new(max: u16) -> Self {
        Self {
            max,
            duty: Rc::new(Cell::new(0)),
        }
    }

    pub fn duty(&self) -> u16 {
        self.duty.get()
    }
}

impl pwm::ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Infallible> {
        self.duty.set(duty);
        Ok(())
    }
}

/// PWM channel that rejects every update
pub struct FailingPwm;

impl pwm::ErrorType for FailingPwm {
    type Error = MockBusError;
}

impl SetDutyCycle for FailingPwm {
    fn max_duty_cycle(&self) -> u16 {
        100
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> core::result::Result<(), MockBusError> {
        Err(MockBusError::Other)
    }
}
