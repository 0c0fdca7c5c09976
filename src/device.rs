//! ESP32-C3 bindings for the logger's collaborators: DHT data lines, power rails,
//! the UART output sink and the millisecond clock.

use embassy_time::Instant;
use esp_hal::Blocking;
use esp_hal::delay::Delay;
use esp_hal::gpio::{AnyPin, DriveMode, Flex, Level, Output, OutputConfig, Pull};
use esp_hal::uart::Uart;

use crate::schedule::Clock;
use crate::sensors::{DhtSensor, Pin, SensorType, frame};

/// Start pulse DHT11 and DHT12 sensors need before they answer.
const SLOW_WAKE_MS: u32 = 20;

#[derive(Debug, Copy, Clone)]
pub enum TransportError {
    Timeout,
    Checksum,
    Pin,
    /// Humidity was requested without a preceding temperature read.
    NoReading,
}

/// One DHT sensor of any model on an open-drain data line.
///
/// A single bus transaction yields both values. The temperature read performs it and keeps
/// the humidity for the following humidity read. Frames are decoded by `dht22_sensor` and
/// reinterpreted for DHT11 and DHT12 sensors, whose fields are laid out differently.
pub struct DhtTransport {
    pin: Flex<'static>,
    delay: Delay,
    sensor_type: SensorType,
    humidity: Option<f32>,
}

impl DhtTransport {
    /// Takes GPIO `pin` as the data line of a `sensor_type` sensor.
    ///
    /// # Safety
    ///
    /// `pin` must not be in use by any other driver.
    pub unsafe fn steal(pin: Pin, sensor_type: SensorType) -> Self {
        let mut flex = Flex::new(unsafe { AnyPin::steal(pin) });
        flex.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        flex.set_input_enable(true);
        flex.set_output_enable(true);
        Self {
            pin: flex,
            delay: Delay::new(),
            sensor_type,
            humidity: None,
        }
    }

    fn wake(&mut self) {
        if matches!(self.sensor_type, SensorType::Dht11 | SensorType::Dht12) {
            // Stretches the driver's own start pulse past the 18 ms these models need.
            self.pin.set_low();
            self.delay.delay_millis(SLOW_WAKE_MS);
        }
    }
}

impl DhtSensor for DhtTransport {
    type Error = TransportError;

    fn begin(&mut self) {
        // Idle level of the bus.
        self.pin.set_high();
        self.humidity = None;
    }

    fn read_temperature(&mut self) -> Result<f32, TransportError> {
        self.humidity = None;
        self.wake();
        let mut sensor = dht22_sensor::Dht22::new(&mut self.pin, &mut self.delay);
        let reading = sensor.read().map_err(|err| match err {
            dht22_sensor::DhtError::ChecksumMismatch => TransportError::Checksum,
            dht22_sensor::DhtError::Timeout => TransportError::Timeout,
            dht22_sensor::DhtError::PinError(_) => TransportError::Pin,
        })?;
        let (temperature, humidity) = frame::reinterpret(
            self.sensor_type,
            reading.temperature,
            reading.relative_humidity,
        );
        self.humidity = Some(humidity);
        Ok(temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, TransportError> {
        self.humidity.take().ok_or(TransportError::NoReading)
    }
}

/// Push-pull output driven high by `SensorArray::initialize` to power the sensors.
///
/// # Safety
///
/// `pin` must not be in use by any other driver.
pub unsafe fn power_pin(pin: Pin) -> Output<'static> {
    Output::new(
        unsafe { AnyPin::steal(pin) },
        Level::Low,
        OutputConfig::default(),
    )
}

/// Blocking UART used as the record output.
pub struct UartSink {
    uart: Uart<'static, Blocking>,
}

impl UartSink {
    pub fn new(uart: Uart<'static, Blocking>) -> Self {
        Self { uart }
    }
}

impl embedded_io::ErrorType for UartSink {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Write for UartSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.uart
            .write(buf)
            .map_err(|_| embedded_io::ErrorKind::Other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart
            .flush()
            .map_err(|_| embedded_io::ErrorKind::Other)
    }
}

/// Milliseconds since boot, truncated so it wraps like Arduino's `millis()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_millis(&self) -> u32 {
        #[allow(clippy::as_conversions)]
        let millis = Instant::now().as_millis() as u32;
        millis
    }
}
