use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{MAX_POWER_PINS, MAX_SENSORS, SensorConfig};
use crate::sensors::{DhtSensor, Measurement, Pin, ReadError, SensorType, ThermalData};

/// Time sensors need after their supply comes up before the first query.
pub const POWER_SETTLE_MS: u32 = 1000;

struct SensorHandle<S> {
    pin: Pin,
    sensor: S,
}

/// A fixed set of sensors of one model, plus the GPIO rails that power them.
///
/// Handles are created once, in configuration order, and never leave the array.
pub struct SensorArray<S, P> {
    sensors: heapless::Vec<SensorHandle<S>, MAX_SENSORS>,
    power_pins: heapless::Vec<P, MAX_POWER_PINS>,
    sensor_type: SensorType,
    initialized: bool,
}

impl<S, P> SensorArray<S, P>
where
    S: DhtSensor,
    P: OutputPin,
{
    /// Binds a driver to every sensor pin and an output to every power pin.
    ///
    /// `new_sensor` and `new_power_pin` are called exactly once per configured pin, in order.
    /// A power pin must already be configured as a push-pull output when returned.
    pub fn new(
        config: &SensorConfig,
        mut new_sensor: impl FnMut(Pin, SensorType) -> S,
        mut new_power_pin: impl FnMut(Pin) -> P,
    ) -> Self {
        let sensor_type = config.sensor_type();
        let mut sensors = heapless::Vec::new();
        for &pin in config.pins() {
            let handle = SensorHandle {
                pin,
                sensor: new_sensor(pin, sensor_type),
            };
            // SensorConfig caps the pin count at MAX_SENSORS.
            let _ = sensors.push(handle);
        }

        let mut power_pins = heapless::Vec::new();
        for &pin in config.power_pins() {
            let _ = power_pins.push(new_power_pin(pin));
        }

        Self {
            sensors,
            power_pins,
            sensor_type,
            initialized: false,
        }
    }

    /// Raises every power pin, waits for the sensors to settle, then starts each driver.
    ///
    /// Safe to call again; each call waits the full settle time.
    pub fn initialize(&mut self, delay: &mut impl DelayNs) -> Result<(), P::Error> {
        for pin in self.power_pins.iter_mut() {
            pin.set_high()?;
        }
        info!(
            "Raised {=usize} power pin(s), settling for {=u32} ms",
            self.power_pins.len(),
            POWER_SETTLE_MS
        );

        delay.delay_ms(POWER_SETTLE_MS);

        for handle in self.sensors.iter_mut() {
            handle.sensor.begin();
        }
        info!(
            "Started {=usize} {=str} sensor(s)",
            self.sensors.len(),
            self.sensor_type.name()
        );

        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Pin of the sensor at `index`, in configuration order.
    pub fn pin(&self, index: usize) -> Option<Pin> {
        self.sensors.get(index).map(|handle| handle.pin)
    }

    pub fn pins(&self) -> impl Iterator<Item = Pin> + '_ {
        self.sensors.iter().map(|handle| handle.pin)
    }

    /// Performs one blocking read of the sensor at `index`.
    ///
    /// Temperature is read first; humidity is only queried when temperature succeeded,
    /// and the heat index only when both did. A non-finite heat index fails the read.
    /// No retries.
    pub fn read_sensor(&mut self, index: usize) -> Measurement {
        let Some(handle) = self.sensors.get_mut(index) else {
            warn!("No sensor at index {=usize}", index);
            return Err(ReadError::NoSensor);
        };

        let temperature = match handle.sensor.read_temperature() {
            Ok(value) if value.is_finite() => value,
            _ => {
                warn!("Pin {=u8}: temperature read failed", handle.pin);
                return Err(ReadError::TemperatureReadFailure);
            }
        };

        let humidity = match handle.sensor.read_humidity() {
            Ok(value) if value.is_finite() => value,
            _ => {
                warn!("Pin {=u8}: humidity read failed", handle.pin);
                return Err(ReadError::HumidityReadFailure);
            }
        };

        let heat_index = handle.sensor.compute_heat_index(temperature, humidity);
        if !heat_index.is_finite() {
            warn!("Pin {=u8}: heat index out of range", handle.pin);
            return Err(ReadError::HeatIndexFailure);
        }

        Ok(ThermalData {
            temperature,
            humidity,
            heat_index,
        })
    }
}
