//! Heat index (apparent temperature) as computed by the Adafruit DHT library.
//!
//! The value comes from a non-linear regression over temperature and relative humidity
//! (Rothfusz, with the NWS low and high humidity adjustments). It is only meaningful at
//! roughly 26.7 °C (80 °F) and above; below that Steadman's simpler estimate is returned
//! and should be treated as approximate.

use num_traits::Float;

// Below this the simple estimate is used (°F).
const REGRESSION_THRESHOLD_F: f32 = 79.0;

fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * 1.8 + 32.0
}

fn fahrenheit_to_celsius(f: f32) -> f32 {
    (f - 32.0) * 0.555_555_6
}

/// Heat index in Celsius for `temperature` (°C) and `humidity` (% RH).
pub fn heat_index_celsius(temperature: f32, humidity: f32) -> f32 {
    fahrenheit_to_celsius(heat_index_fahrenheit(celsius_to_fahrenheit(temperature), humidity))
}

fn heat_index_fahrenheit(t: f32, rh: f32) -> f32 {
    let simple = 0.5 * (t + 61.0 + ((t - 68.0) * 1.2) + (rh * 0.094));
    if simple <= REGRESSION_THRESHOLD_F {
        return simple;
    }

    let mut hi = -42.379 + 2.049_015_2 * t + 10.143_331 * rh
        - 0.224_755_4 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh;

    if rh < 13.0 && (80.0..=112.0).contains(&t) {
        hi -= ((13.0 - rh) * 0.25) * Float::sqrt((17.0 - Float::abs(t - 95.0)) * 0.058_82);
    } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
        hi += ((rh - 85.0) * 0.1) * ((87.0 - t) * 0.2);
    }

    hi
}
