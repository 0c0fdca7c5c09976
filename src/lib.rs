#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "esp", feature(impl_trait_in_assoc_type))]

#[macro_use]
mod macros;

pub mod config;
#[cfg(feature = "esp")]
pub mod device;
pub mod logger;
pub mod schedule;
pub mod sensors;
#[cfg(feature = "esp")]
pub mod task;

pub use config::{CONFIG, ConfigError, SensorConfig, SerialPort, SerialSettings};
pub use logger::{IntervalLogger, LogRecord, LoggerError, LoggerState};
pub use schedule::{Clock, IntervalBudget};
pub use sensors::{DhtSensor, Measurement, Pin, ReadError, SensorArray, SensorType, ThermalData};
