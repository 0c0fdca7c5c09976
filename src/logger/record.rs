use core::fmt::Write as _;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json_core::ser::Error as SerError;

use crate::config::MAX_SENSORS;
use crate::sensors::{Measurement, Pin, ThermalData};

/// Upper bound on the text of one float. ryu never needs more than this.
const FLOAT_TEXT_MAX: usize = 24;
/// `"255":{"t":F,"h":F,"hi":F},` with every `F` at its longest.
const ENTRY_TEXT_MAX: usize = 6 + 5 + 5 + 6 + 2 + 3 * FLOAT_TEXT_MAX;

/// Bytes reserved for one serialized record, newline included. Holds a full array of
/// readings whatever values the sensors return.
pub const RECORD_CAPACITY: usize = 2 + MAX_SENSORS * ENTRY_TEXT_MAX + 1;

/// A serialized record, terminated by `\n`.
pub type Line = heapless::Vec<u8, RECORD_CAPACITY>;

/// One tick's results, keyed by pin in configuration order.
///
/// Serializes as a single JSON object, e.g.
/// `{"4":{"t":23.5,"h":45.2,"hi":23.8},"5":{"e":"Unknown sensor"}}`.
#[derive(Debug, Clone, Default)]
pub struct LogRecord {
    entries: heapless::Vec<(Pin, Measurement), MAX_SENSORS>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the measurement for `pin`. Fails when the record is full.
    pub fn insert(&mut self, pin: Pin, measurement: Measurement) -> Result<(), Measurement> {
        self.entries
            .push((pin, measurement))
            .map_err(|(_, measurement)| measurement)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, pin: Pin) -> Option<&Measurement> {
        self.entries
            .iter()
            .find(|(key, _)| *key == pin)
            .map(|(_, measurement)| measurement)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pin, &Measurement)> + '_ {
        self.entries.iter().map(|(pin, measurement)| (*pin, measurement))
    }

    /// Serializes the record as JSON followed by a newline.
    pub fn to_line(&self) -> Result<Line, SerError> {
        let mut line = Line::new();
        line.resize(RECORD_CAPACITY, 0).map_err(|_| SerError::BufferFull)?;
        let len = serde_json_core::to_slice(self, &mut line[..RECORD_CAPACITY - 1])?;
        line.truncate(len);
        line.push(b'\n').map_err(|_| SerError::BufferFull)?;
        Ok(line)
    }
}

/// How one pin's slot appears in the record.
#[derive(Serialize)]
#[serde(untagged)]
enum Slot<'a> {
    Reading(&'a ThermalData),
    Failure {
        #[serde(rename = "e")]
        message: &'static str,
    },
}

impl<'a> From<&'a Measurement> for Slot<'a> {
    fn from(measurement: &'a Measurement) -> Self {
        match measurement {
            Ok(data) => Slot::Reading(data),
            Err(err) => Slot::Failure {
                message: err.message(),
            },
        }
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (pin, measurement) in self.iter() {
            let mut key = heapless::String::<3>::new();
            // u8 has at most three digits.
            let _ = write!(key, "{}", pin);
            map.serialize_entry(key.as_str(), &Slot::from(measurement))?;
        }
        map.end()
    }
}
