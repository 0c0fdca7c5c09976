use serde::Serialize;

pub mod frame;
pub mod heat_index;
pub mod sensor_array;

pub use sensor_array::SensorArray;

/// GPIO number a sensor or power rail is attached to.
pub type Pin = u8;

/// Sensor models of the DHT family. All pins of one array share a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorType {
    Dht11,
    Dht12,
    /// Also sold as the AM2301.
    Dht21,
    Dht22,
}

impl SensorType {
    /// Parses a model name such as `"DHT22"` or `"am2301"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            ("DHT11", SensorType::Dht11),
            ("DHT12", SensorType::Dht12),
            ("DHT21", SensorType::Dht21),
            ("AM2301", SensorType::Dht21),
            ("DHT22", SensorType::Dht22),
        ]
        .into_iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, kind)| kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            SensorType::Dht11 => "DHT11",
            SensorType::Dht12 => "DHT12",
            SensorType::Dht21 => "DHT21",
            SensorType::Dht22 => "DHT22",
        }
    }

    /// Shortest time the sensor tolerates between two queries.
    pub fn min_read_interval_ms(self) -> u32 {
        match self {
            SensorType::Dht11 | SensorType::Dht12 => 1000,
            SensorType::Dht21 | SensorType::Dht22 => 2000,
        }
    }
}

/// Driver for a single DHT sensor on its own data pin.
///
/// Implementations own the bus timing. All values are in Celsius and percent relative
/// humidity; a read that fails or yields a non-finite value is reported as a failed read.
pub trait DhtSensor {
    type Error: core::fmt::Debug;

    /// Prepares the data line. Called once per `SensorArray::initialize`.
    fn begin(&mut self) {}

    fn read_temperature(&mut self) -> Result<f32, Self::Error>;

    fn read_humidity(&mut self) -> Result<f32, Self::Error>;

    /// Apparent temperature in Celsius from a temperature and humidity pair.
    fn compute_heat_index(&self, temperature: f32, humidity: f32) -> f32 {
        heat_index::heat_index_celsius(temperature, humidity)
    }
}

/// A complete reading from one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermalData {
    #[serde(rename = "t")]
    pub temperature: f32,
    #[serde(rename = "h")]
    pub humidity: f32,
    #[serde(rename = "hi")]
    pub heat_index: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// The index does not name a configured sensor.
    NoSensor,
    TemperatureReadFailure,
    HumidityReadFailure,
    /// Both values were read but give no finite heat index.
    HeatIndexFailure,
}

impl ReadError {
    /// Text placed in the sensor's slot of the log record.
    pub fn message(self) -> &'static str {
        match self {
            ReadError::NoSensor => "Unknown sensor",
            ReadError::TemperatureReadFailure => "Error reading temperature",
            ReadError::HumidityReadFailure => "Error reading humidity",
            ReadError::HeatIndexFailure => "Error computing heat index",
        }
    }
}

/// Outcome of reading one sensor: either the full reading or why it failed.
pub type Measurement = Result<ThermalData, ReadError>;
