//! Scripted stand-ins for the sensor driver, GPIO, delay, clock and serial sink.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use dht_logger::{Clock, DhtSensor, Pin, SensorType};

/// What a fake sensor returns for one value: a number, or a driver error.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    Value(f32),
    Fail,
}

#[derive(Debug, Default)]
pub struct SensorLog {
    pub begins: Cell<usize>,
    pub temperature_reads: Cell<usize>,
    pub humidity_reads: Cell<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct FakeSensorError;

/// Returns the same scripted temperature and humidity on every read.
pub struct FakeSensor {
    pub pin: Pin,
    pub sensor_type: SensorType,
    temperature: Script,
    humidity: Script,
    log: Rc<SensorLog>,
}

impl FakeSensor {
    pub fn new(pin: Pin, sensor_type: SensorType, temperature: Script, humidity: Script) -> Self {
        Self {
            pin,
            sensor_type,
            temperature,
            humidity,
            log: Rc::new(SensorLog::default()),
        }
    }

    pub fn log(&self) -> Rc<SensorLog> {
        Rc::clone(&self.log)
    }

    fn answer(script: Script) -> Result<f32, FakeSensorError> {
        match script {
            Script::Value(value) => Ok(value),
            Script::Fail => Err(FakeSensorError),
        }
    }
}

impl DhtSensor for FakeSensor {
    type Error = FakeSensorError;

    fn begin(&mut self) {
        self.log.begins.set(self.log.begins.get() + 1);
    }

    fn read_temperature(&mut self) -> Result<f32, FakeSensorError> {
        self.log
            .temperature_reads
            .set(self.log.temperature_reads.get() + 1);
        Self::answer(self.temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, FakeSensorError> {
        self.log
            .humidity_reads
            .set(self.log.humidity_reads.get() + 1);
        Self::answer(self.humidity)
    }
}

/// Output pin that records every level it is driven to.
#[derive(Debug, Clone)]
pub struct FakePowerPin {
    pub pin: Pin,
    pub levels: Rc<RefCell<Vec<bool>>>,
}

impl FakePowerPin {
    pub fn new(pin: Pin) -> Self {
        Self {
            pin,
            levels: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl embedded_hal::digital::ErrorType for FakePowerPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for FakePowerPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

/// Delay that only accumulates the requested time.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
        self.calls += 1;
    }
}

/// Clock that replays scripted timestamps and then keeps returning the last one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClock {
    times: Rc<RefCell<VecDeque<u32>>>,
    last: Rc<Cell<u32>>,
}

impl ScriptedClock {
    pub fn new(times: &[u32]) -> Self {
        Self {
            times: Rc::new(RefCell::new(times.iter().copied().collect())),
            last: Rc::new(Cell::new(0)),
        }
    }

    pub fn push(&self, times: &[u32]) {
        self.times.borrow_mut().extend(times.iter().copied());
    }
}

impl Clock for ScriptedClock {
    fn now_millis(&self) -> u32 {
        if let Some(next) = self.times.borrow_mut().pop_front() {
            self.last.set(next);
        }
        self.last.get()
    }
}

/// Serial sink capturing everything written to it.
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub bytes: Vec<u8>,
    pub flushes: usize,
}

impl CaptureSink {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.bytes).expect("sink received invalid UTF-8")
    }

    pub fn lines(&self) -> Vec<&str> {
        self.text().lines().collect()
    }
}

impl embedded_io::ErrorType for CaptureSink {
    type Error = Infallible;
}

impl embedded_io::Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        self.flushes += 1;
        Ok(())
    }
}

/// Sink whose writes always fail.
#[derive(Debug, Default)]
pub struct BrokenSink;

impl embedded_io::ErrorType for BrokenSink {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> Result<usize, embedded_io::ErrorKind> {
        Err(embedded_io::ErrorKind::BrokenPipe)
    }

    fn flush(&mut self) -> Result<(), embedded_io::ErrorKind> {
        Ok(())
    }
}
