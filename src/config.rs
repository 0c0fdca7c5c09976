//! Configuration for the DHT logger firmware.
//!
//! Firmware settings are set via environment variables at compile time and validated once
//! at startup. Sensor wiring is described by a [`SensorConfig`].

use crate::sensors::{Pin, SensorType};

/// Largest number of sensors one array can drive.
pub const MAX_SENSORS: usize = 16;
/// Largest number of GPIO power rails one array can drive.
pub const MAX_POWER_PINS: usize = 8;
/// Logging interval. DHT sensors can only be queried every 2 seconds, so this leaves margin.
pub const LOG_INTERVAL_MS: u32 = 2500;

pub type PinList<const N: usize> = heapless::Vec<Pin, N>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    NoSensorPins,
    DuplicatePin(Pin),
    /// A pin is listed both as a sensor pin and a power pin.
    PowerPinIsSensorPin(Pin),
    TooManySensorPins,
    TooManyPowerPins,
    InvalidPin,
    InvalidNumber,
    UnknownSensorType,
    /// The logging interval is shorter than the sensor model tolerates.
    IntervalTooShort { min_ms: u32 },
    UnknownSerialPort,
    /// A serial pin is also a sensor or power pin, or TX and RX are the same pin.
    SerialPinInUse(Pin),
}

/// Wiring of one sensor array. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    pins: PinList<MAX_SENSORS>,
    sensor_type: SensorType,
    power_pins: PinList<MAX_POWER_PINS>,
}

impl SensorConfig {
    /// Validates and stores the wiring. `pins` must be non-empty with unique entries;
    /// `power_pins` may be empty.
    pub fn new(
        pins: &[Pin],
        sensor_type: SensorType,
        power_pins: &[Pin],
    ) -> Result<Self, ConfigError> {
        if pins.is_empty() {
            return Err(ConfigError::NoSensorPins);
        }
        let pins = unique_pins::<MAX_SENSORS>(pins, ConfigError::TooManySensorPins)?;
        let power_pins = unique_pins::<MAX_POWER_PINS>(power_pins, ConfigError::TooManyPowerPins)?;
        if let Some(&pin) = power_pins.iter().find(|pin| pins.contains(pin)) {
            return Err(ConfigError::PowerPinIsSensorPin(pin));
        }

        Ok(Self {
            pins,
            sensor_type,
            power_pins,
        })
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn power_pins(&self) -> &[Pin] {
        &self.power_pins
    }
}

fn unique_pins<const N: usize>(
    pins: &[Pin],
    overflow: ConfigError,
) -> Result<PinList<N>, ConfigError> {
    let mut list = PinList::<N>::new();
    for &pin in pins {
        if list.contains(&pin) {
            return Err(ConfigError::DuplicatePin(pin));
        }
        list.push(pin).map_err(|_| overflow)?;
    }
    Ok(list)
}

/// Checks that `interval_ms` gives `sensor_type` enough time between queries.
pub fn validate_interval(interval_ms: u32, sensor_type: SensorType) -> Result<u32, ConfigError> {
    let min_ms = sensor_type.min_read_interval_ms();
    if interval_ms < min_ms {
        return Err(ConfigError::IntervalTooShort { min_ms });
    }
    Ok(interval_ms)
}

/// Parses a comma-separated list of decimal pin numbers, e.g. `"4, 5,12"`.
/// An empty or blank string yields an empty list.
pub fn parse_pin_list<const N: usize>(list: &str) -> Result<PinList<N>, ConfigError> {
    let mut pins = PinList::<N>::new();
    if list.trim().is_empty() {
        return Ok(pins);
    }
    for item in list.split(',') {
        let pin = parse_pin(item)?;
        pins.push(pin).map_err(|_| ConfigError::TooManySensorPins)?;
    }
    Ok(pins)
}

fn parse_pin(value: &str) -> Result<Pin, ConfigError> {
    value
        .trim()
        .parse::<Pin>()
        .map_err(|_| ConfigError::InvalidPin)
}

fn parse_number(value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidNumber)
}

/// UART peripheral carrying the record lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialPort {
    Uart0,
    Uart1,
}

impl SerialPort {
    /// Parses `"UART0"`/`"UART1"`, or the Arduino names `"Serial"`/`"Serial1"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            ("UART0", SerialPort::Uart0),
            ("Serial", SerialPort::Uart0),
            ("UART1", SerialPort::Uart1),
            ("Serial1", SerialPort::Uart1),
        ]
        .into_iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, port)| port)
    }
}

/// Validated serial output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialSettings {
    pub port: SerialPort,
    pub baud: u32,
    pub tx_pin: Pin,
    pub rx_pin: Pin,
}

/// Serial output settings.
#[derive(Debug, Clone, Copy)]
pub struct SerialConfig {
    /// UART peripheral, e.g. `"UART1"`.
    pub port: &'static str,
    /// UART baud rate, e.g. `"115200"`.
    pub baud: &'static str,
    pub tx_pin: &'static str,
    pub rx_pin: &'static str,
}

/// Sensor wiring settings, as raw strings until validated.
#[derive(Debug, Clone, Copy)]
pub struct WiringConfig {
    /// Comma-separated sensor data pins.
    pub sensor_pins: &'static str,
    /// Sensor model name, e.g. `"DHT22"`.
    pub sensor_type: &'static str,
    /// Comma-separated pins raised high to power the sensors.
    pub power_pins: &'static str,
}

/// Logger timing settings.
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    /// Length of one logging interval in milliseconds.
    pub interval_ms: &'static str,
}

/// Global application configuration.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub serial: SerialConfig,
    pub wiring: WiringConfig,
    pub logger: LoggerConfig,
}

impl Config {
    /// Creates a new configuration from compile-time environment variables.
    const fn new() -> Self {
        Self {
            serial: SerialConfig {
                port: match option_env!("SERIAL_PORT") {
                    Some(port) => port,
                    None => "UART0",
                },
                baud: match option_env!("SERIAL_BAUD") {
                    Some(baud) => baud,
                    None => "115200",
                },
                tx_pin: match option_env!("SERIAL_TX_PIN") {
                    Some(pin) => pin,
                    None => "21",
                },
                rx_pin: match option_env!("SERIAL_RX_PIN") {
                    Some(pin) => pin,
                    None => "20",
                },
            },
            wiring: WiringConfig {
                sensor_pins: match option_env!("DHT_SENSOR_PINS") {
                    Some(pins) => pins,
                    None => "4",
                },
                sensor_type: match option_env!("DHT_SENSOR_TYPE") {
                    Some(kind) => kind,
                    None => "DHT22",
                },
                power_pins: match option_env!("DHT_POWER_PINS") {
                    Some(pins) => pins,
                    None => "",
                },
            },
            logger: LoggerConfig {
                interval_ms: match option_env!("LOG_INTERVAL_MS") {
                    Some(interval) => interval,
                    None => "2500",
                },
            },
        }
    }

    /// Parses and validates the sensor wiring.
    pub fn sensor_config(&self) -> Result<SensorConfig, ConfigError> {
        let sensor_type = SensorType::from_name(self.wiring.sensor_type)
            .ok_or(ConfigError::UnknownSensorType)?;
        let pins = parse_pin_list::<MAX_SENSORS>(self.wiring.sensor_pins)?;
        let power_pins = parse_pin_list::<MAX_POWER_PINS>(self.wiring.power_pins)
            .map_err(|err| match err {
                ConfigError::TooManySensorPins => ConfigError::TooManyPowerPins,
                other => other,
            })?;
        SensorConfig::new(&pins, sensor_type, &power_pins)
    }

    pub fn baud_rate(&self) -> Result<u32, ConfigError> {
        match parse_number(self.serial.baud)? {
            0 => Err(ConfigError::InvalidNumber),
            baud => Ok(baud),
        }
    }

    /// Parses the serial settings and checks that the UART pins are free of the sensor wiring.
    pub fn serial_settings(&self, wiring: &SensorConfig) -> Result<SerialSettings, ConfigError> {
        let port = SerialPort::from_name(self.serial.port).ok_or(ConfigError::UnknownSerialPort)?;
        let baud = self.baud_rate()?;
        let tx_pin = parse_pin(self.serial.tx_pin)?;
        let rx_pin = parse_pin(self.serial.rx_pin)?;

        if tx_pin == rx_pin {
            return Err(ConfigError::SerialPinInUse(tx_pin));
        }
        for pin in [tx_pin, rx_pin] {
            if wiring.pins().contains(&pin) || wiring.power_pins().contains(&pin) {
                return Err(ConfigError::SerialPinInUse(pin));
            }
        }

        Ok(SerialSettings {
            port,
            baud,
            tx_pin,
            rx_pin,
        })
    }

    /// The logging interval, checked against the configured sensor model.
    pub fn log_interval_ms(&self, sensor_type: SensorType) -> Result<u32, ConfigError> {
        validate_interval(parse_number(self.logger.interval_ms)?, sensor_type)
    }
}

/// Global configuration instance.
pub static CONFIG: Config = Config::new();

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sensor_pins: &'static str, power_pins: &'static str) -> Config {
        Config {
            serial: SerialConfig {
                port: "UART0",
                baud: "115200",
                tx_pin: "21",
                rx_pin: "20",
            },
            wiring: WiringConfig {
                sensor_pins,
                sensor_type: "DHT22",
                power_pins,
            },
            logger: LoggerConfig {
                interval_ms: "2500",
            },
        }
    }

    #[test]
    fn rejects_empty_pin_list() {
        assert_eq!(
            SensorConfig::new(&[], SensorType::Dht22, &[]),
            Err(ConfigError::NoSensorPins)
        );
    }

    #[test]
    fn pin_zero_is_a_valid_sensor_pin() {
        let config = SensorConfig::new(&[0, 7], SensorType::Dht11, &[]).unwrap();
        assert_eq!(config.pins(), &[0, 7]);
        assert!(config.power_pins().is_empty());
    }

    #[test]
    fn rejects_duplicate_and_overlapping_pins() {
        assert_eq!(
            SensorConfig::new(&[4, 5, 4], SensorType::Dht22, &[]),
            Err(ConfigError::DuplicatePin(4))
        );
        assert_eq!(
            SensorConfig::new(&[4, 5], SensorType::Dht22, &[9, 9]),
            Err(ConfigError::DuplicatePin(9))
        );
        assert_eq!(
            SensorConfig::new(&[4, 5], SensorType::Dht22, &[5]),
            Err(ConfigError::PowerPinIsSensorPin(5))
        );
    }

    #[test]
    fn rejects_oversized_lists() {
        let many: [Pin; MAX_SENSORS + 1] = core::array::from_fn(|i| i as Pin);
        assert_eq!(
            SensorConfig::new(&many, SensorType::Dht22, &[]),
            Err(ConfigError::TooManySensorPins)
        );
        assert_eq!(
            SensorConfig::new(&[40], SensorType::Dht22, &many[..MAX_POWER_PINS + 1]),
            Err(ConfigError::TooManyPowerPins)
        );
    }

    #[test]
    fn parses_pin_lists() {
        let pins = parse_pin_list::<4>(" 4, 5,12 ").unwrap();
        assert_eq!(pins.as_slice(), &[4, 5, 12]);
        assert!(parse_pin_list::<4>("").unwrap().is_empty());
        assert_eq!(parse_pin_list::<4>("4,,5"), Err(ConfigError::InvalidPin));
        assert_eq!(parse_pin_list::<4>("256"), Err(ConfigError::InvalidPin));
        assert_eq!(
            parse_pin_list::<2>("1,2,3"),
            Err(ConfigError::TooManySensorPins)
        );
    }

    #[test]
    fn builds_sensor_config_from_strings() {
        let sensors = config("4,5", "2").sensor_config().unwrap();
        assert_eq!(sensors.pins(), &[4, 5]);
        assert_eq!(sensors.power_pins(), &[2]);
        assert_eq!(sensors.sensor_type(), SensorType::Dht22);

        assert_eq!(
            config("", "").sensor_config(),
            Err(ConfigError::NoSensorPins)
        );
        assert_eq!(
            config("4", "1,2,3,5,6,7,8,9,10").sensor_config(),
            Err(ConfigError::TooManyPowerPins)
        );
    }

    #[test]
    fn rejects_unknown_sensor_type() {
        let mut cfg = config("4", "");
        cfg.wiring.sensor_type = "BME280";
        assert_eq!(cfg.sensor_config(), Err(ConfigError::UnknownSensorType));
    }

    #[test]
    fn validates_interval_against_sensor_model() {
        let cfg = config("4", "");
        assert_eq!(cfg.log_interval_ms(SensorType::Dht22), Ok(2500));
        assert_eq!(
            validate_interval(1500, SensorType::Dht22),
            Err(ConfigError::IntervalTooShort { min_ms: 2000 })
        );
        assert_eq!(validate_interval(1500, SensorType::Dht11), Ok(1500));
        assert_eq!(
            validate_interval(0, SensorType::Dht11),
            Err(ConfigError::IntervalTooShort { min_ms: 1000 })
        );
    }

    #[test]
    fn parses_baud_rate() {
        let mut cfg = config("4", "");
        assert_eq!(cfg.baud_rate(), Ok(115_200));
        cfg.serial.baud = "fast";
        assert_eq!(cfg.baud_rate(), Err(ConfigError::InvalidNumber));
        cfg.serial.baud = "0";
        assert_eq!(cfg.baud_rate(), Err(ConfigError::InvalidNumber));
    }

    #[test]
    fn parses_serial_port_names() {
        assert_eq!(SerialPort::from_name("UART0"), Some(SerialPort::Uart0));
        assert_eq!(SerialPort::from_name(" uart1"), Some(SerialPort::Uart1));
        assert_eq!(SerialPort::from_name("Serial"), Some(SerialPort::Uart0));
        assert_eq!(SerialPort::from_name("Serial1"), Some(SerialPort::Uart1));
        assert_eq!(SerialPort::from_name("Serial2"), None);
    }

    #[test]
    fn builds_serial_settings() {
        let mut cfg = config("4,5", "2");
        let wiring = cfg.sensor_config().unwrap();
        assert_eq!(
            cfg.serial_settings(&wiring),
            Ok(SerialSettings {
                port: SerialPort::Uart0,
                baud: 115_200,
                tx_pin: 21,
                rx_pin: 20,
            })
        );

        cfg.serial.port = "UART1";
        cfg.serial.tx_pin = "7";
        cfg.serial.rx_pin = "6";
        let settings = cfg.serial_settings(&wiring).unwrap();
        assert_eq!(settings.port, SerialPort::Uart1);
        assert_eq!((settings.tx_pin, settings.rx_pin), (7, 6));
    }

    #[test]
    fn rejects_bad_serial_settings() {
        let mut cfg = config("4,5", "2");
        let wiring = cfg.sensor_config().unwrap();

        cfg.serial.port = "UART3";
        assert_eq!(
            cfg.serial_settings(&wiring),
            Err(ConfigError::UnknownSerialPort)
        );

        cfg.serial.port = "UART1";
        cfg.serial.tx_pin = "5";
        assert_eq!(
            cfg.serial_settings(&wiring),
            Err(ConfigError::SerialPinInUse(5))
        );

        cfg.serial.tx_pin = "21";
        cfg.serial.rx_pin = "2";
        assert_eq!(
            cfg.serial_settings(&wiring),
            Err(ConfigError::SerialPinInUse(2))
        );

        cfg.serial.rx_pin = "21";
        assert_eq!(
            cfg.serial_settings(&wiring),
            Err(ConfigError::SerialPinInUse(21))
        );

        cfg.serial.rx_pin = "x";
        assert_eq!(cfg.serial_settings(&wiring), Err(ConfigError::InvalidPin));
    }
}
