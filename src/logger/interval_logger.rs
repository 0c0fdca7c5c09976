use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::Write;

use crate::config::{ConfigError, LOG_INTERVAL_MS, validate_interval};
use crate::logger::LogRecord;
use crate::schedule::{Clock, IntervalBudget, remaining_budget};
use crate::sensors::{DhtSensor, SensorArray};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoggerState {
    Uninitialized,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoggerError<E> {
    /// `tick` was called before `initialize`.
    NotInitialized,
    /// The record could not be serialized into the line buffer.
    Format,
    /// The output sink rejected the line.
    Write(E),
}

/// Polls every sensor once per tick and writes the results as one JSON line.
///
/// The caller drives the schedule: call [`IntervalLogger::initialize`] once, then loop on
/// [`IntervalLogger::tick`] and wait the returned budget before the next call.
pub struct IntervalLogger<S, P, W, C> {
    sensors: SensorArray<S, P>,
    sink: W,
    clock: C,
    interval_ms: u32,
    state: LoggerState,
}

impl<S, P, W, C> IntervalLogger<S, P, W, C>
where
    S: DhtSensor,
    P: OutputPin,
    W: Write,
    C: Clock,
{
    pub fn new(sensors: SensorArray<S, P>, sink: W, clock: C) -> Self {
        Self {
            sensors,
            sink,
            clock,
            interval_ms: LOG_INTERVAL_MS,
            state: LoggerState::Uninitialized,
        }
    }

    /// Replaces the default interval. It must not be shorter than the sensor model allows.
    pub fn with_interval(mut self, interval_ms: u32) -> Result<Self, ConfigError> {
        self.interval_ms = validate_interval(interval_ms, self.sensors.sensor_type())?;
        Ok(self)
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn state(&self) -> LoggerState {
        self.state
    }

    pub fn sensors(&self) -> &SensorArray<S, P> {
        &self.sensors
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Powers and starts the sensors. Repeating it is harmless but waits the settle time again.
    pub fn initialize(&mut self, delay: &mut impl DelayNs) -> Result<(), P::Error> {
        self.sensors.initialize(delay)?;
        self.state = LoggerState::Ready;
        Ok(())
    }

    /// Reads every sensor once and writes one record line.
    ///
    /// Sensor failures are reported inside the record and never fail the tick. Returns the
    /// time left in the current interval.
    pub fn tick(&mut self) -> Result<IntervalBudget, LoggerError<W::Error>> {
        if self.state != LoggerState::Ready {
            return Err(LoggerError::NotInitialized);
        }

        let start = self.clock.now_millis();
        let record = self.poll();
        self.emit(&record)?;
        let end = self.clock.now_millis();

        let budget = remaining_budget(start, end, self.interval_ms);
        debug!(
            "Logged {=usize} sensor(s), {=u32} ms left in interval",
            record.len(),
            budget.as_millis()
        );
        Ok(budget)
    }

    fn poll(&mut self) -> LogRecord {
        let mut record = LogRecord::new();
        for index in 0..self.sensors.len() {
            let measurement = self.sensors.read_sensor(index);
            let Some(pin) = self.sensors.pin(index) else {
                continue;
            };
            // The record holds as many entries as the array has sensors.
            let _ = record.insert(pin, measurement);
        }
        record
    }

    fn emit(&mut self, record: &LogRecord) -> Result<(), LoggerError<W::Error>> {
        let line = record.to_line().map_err(|_| {
            warn!("Record could not be serialized");
            LoggerError::Format
        })?;
        self.sink
            .write_all(&line)
            .map_err(LoggerError::Write)?;
        self.sink.flush().map_err(LoggerError::Write)
    }
}
