//! Field layouts of the 40-bit DHT data frame.
//!
//! The firmware's bus driver decodes every frame with the DHT22 layout. DHT11 and DHT12 use
//! the same wire timing but pack their fields differently, so their values are recovered from
//! the frame bytes.

use num_traits::Float;

use crate::sensors::SensorType;

/// The four data bytes of a frame, checksum excluded.
pub type FrameBytes = [u8; 4];

/// Rebuilds the data bytes from a temperature and humidity decoded with the DHT22 layout.
pub fn dht22_bytes(temperature: f32, humidity: f32) -> FrameBytes {
    #[allow(clippy::as_conversions)]
    let humidity = Float::round(humidity * 10.0) as u16;
    #[allow(clippy::as_conversions)]
    let magnitude = Float::round(Float::abs(temperature) * 10.0) as u16;
    let sign = if temperature.is_sign_negative() {
        0x80
    } else {
        0
    };

    let [h_high, h_low] = humidity.to_be_bytes();
    let [t_high, t_low] = magnitude.to_be_bytes();
    [h_high, h_low, (t_high & 0x7F) | sign, t_low]
}

/// Decodes data bytes with the field layout of `sensor_type` into (temperature, humidity).
pub fn decode(sensor_type: SensorType, bytes: FrameBytes) -> (f32, f32) {
    let [b0, b1, b2, b3] = bytes;
    match sensor_type {
        SensorType::Dht11 => {
            let humidity = f32::from(b0) + f32::from(b1) * 0.1;
            let temperature = f32::from(b2) + f32::from(b3 & 0x0F) * 0.1;
            let temperature = if b3 & 0x80 != 0 {
                -temperature
            } else {
                temperature
            };
            (temperature, humidity)
        }
        SensorType::Dht12 => {
            let humidity = f32::from(b0) + f32::from(b1) * 0.1;
            let temperature = f32::from(b2 & 0x7F) + f32::from(b3 & 0x0F) * 0.1;
            let temperature = if b2 & 0x80 != 0 {
                -temperature
            } else {
                temperature
            };
            (temperature, humidity)
        }
        SensorType::Dht21 | SensorType::Dht22 => {
            let humidity = f32::from(u16::from_be_bytes([b0, b1])) * 0.1;
            let temperature = f32::from(u16::from_be_bytes([b2 & 0x7F, b3])) * 0.1;
            let temperature = if b2 & 0x80 != 0 {
                -temperature
            } else {
                temperature
            };
            (temperature, humidity)
        }
    }
}

/// Reinterprets values decoded with the DHT22 layout for the model actually on the wire.
pub fn reinterpret(sensor_type: SensorType, temperature: f32, humidity: f32) -> (f32, f32) {
    match sensor_type {
        SensorType::Dht21 | SensorType::Dht22 => (temperature, humidity),
        SensorType::Dht11 | SensorType::Dht12 => {
            decode(sensor_type, dht22_bytes(temperature, humidity))
        }
    }
}
