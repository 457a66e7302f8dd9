//! Decoder for Environmental Sensing (0x181A) service data.
//!
//! Two third-party thermometer firmwares broadcast under the same service UUID
//! with incompatible layouts. The layout is selected by payload length only:
//!
//! | Length | Format | Byte order | MAC order | Temperature | Humidity |
//! |---|---|---|---|---|---|
//! | >= 15 | [`PayloadFormat::Extended`] | little-endian | reversed | i16 x 0.01 °C | i16 x 0.01 % |
//! | 13 | [`PayloadFormat::Compact`] | big-endian | forward | i16 x 0.1 °C | u8 % |
//!
//! Every other length is rejected.
//!
//! Extended layout:
//!
//! ```text
//! 0..6   MAC, lowest octet first
//! 6..8   temperature  i16 LE  x0.01 °C
//! 8..10  humidity     i16 LE  x0.01 %
//! 10..12 battery      u16 LE  mV
//! 12     battery      %
//! 13     counter
//! 14     flags
//! 15..   ignored
//! ```
//!
//! Compact layout:
//!
//! ```text
//! 0..6   MAC, highest octet first
//! 6..8   temperature  i16 BE  x0.1 °C
//! 8      humidity     %
//! 9      battery      %
//! 10..12 battery      u16 BE  mV
//! 12     counter
//! ```

use crate::device_id::DeviceId;
use crate::reading::SensorReading;
use std::fmt;
use thiserror::Error;

/// Minimum length of an extended payload. Longer payloads are accepted, trailing bytes ignored.
pub const EXTENDED_MIN_LEN: usize = 15;

/// Exact length of a compact payload.
pub const COMPACT_LEN: usize = 13;

/// The wire layout a reading was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    /// Little-endian custom layout, 0.01 resolution, carries flags
    Extended,
    /// Big-endian layout, 0.1 °C resolution, no flags
    Compact,
}

/// Status bitfield carried by the extended format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusFlags(pub u8);

impl StatusFlags {
    const REED_SWITCH: u8 = 1 << 0;
    const OUTPUT_PIN: u8 = 1 << 1;
    const OUTPUT_CONTROLLED: u8 = 1 << 2;
    const TEMPERATURE_TRIGGER: u8 = 1 << 3;
    const HUMIDITY_TRIGGER: u8 = 1 << 4;

    /// Raw bits as broadcast.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Reed switch input state.
    pub fn reed_switch(self) -> bool {
        self.0 & Self::REED_SWITCH != 0
    }

    /// Value of the trigger output pin.
    pub fn output_pin(self) -> bool {
        self.0 & Self::OUTPUT_PIN != 0
    }

    /// Output pin is driven by the configured trigger thresholds.
    pub fn output_controlled(self) -> bool {
        self.0 & Self::OUTPUT_CONTROLLED != 0
    }

    /// Temperature crossed its configured trigger threshold.
    pub fn temperature_trigger(self) -> bool {
        self.0 & Self::TEMPERATURE_TRIGGER != 0
    }

    /// Humidity crossed its configured trigger threshold.
    pub fn humidity_trigger(self) -> bool {
        self.0 & Self::HUMIDITY_TRIGGER != 0
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Reasons a service-data payload is not turned into a reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Length matches neither the extended nor the compact layout
    #[error("Unrecognized payload length: {0} bytes (expected 13 or at least 15)")]
    UnrecognizedLength(usize),
}

/// Decode an Environmental Sensing service-data payload.
///
/// The payload must be the service data for UUID 0x181A; filtering by UUID is the
/// caller's job. The function is pure: equal inputs give equal outputs.
pub fn decode(data: &[u8]) -> Result<SensorReading, DecodeError> {
    if let Some(extended) = data.first_chunk::<EXTENDED_MIN_LEN>() {
        Ok(decode_extended(extended))
    } else if let Ok(compact) = <&[u8; COMPACT_LEN]>::try_from(data) {
        Ok(decode_compact(compact))
    } else {
        Err(DecodeError::UnrecognizedLength(data.len()))
    }
}

fn mac(data: &[u8]) -> [u8; 6] {
    [data[0], data[1], data[2], data[3], data[4], data[5]]
}

fn decode_extended(data: &[u8; EXTENDED_MIN_LEN]) -> SensorReading {
    let temperature = i16::from_le_bytes([data[6], data[7]]);
    let humidity = i16::from_le_bytes([data[8], data[9]]);

    SensorReading {
        format: PayloadFormat::Extended,
        device_id: DeviceId::from_reversed(mac(data)),
        battery_percent: data[12],
        battery_mv: u16::from_le_bytes([data[10], data[11]]),
        temperature: f64::from(temperature) / 100.0,
        humidity: f64::from(humidity) / 100.0,
        counter: data[13],
        flags: Some(StatusFlags(data[14])),
    }
}

fn decode_compact(data: &[u8; COMPACT_LEN]) -> SensorReading {
    let temperature = i16::from_be_bytes([data[6], data[7]]);

    SensorReading {
        format: PayloadFormat::Compact,
        device_id: DeviceId::from_forward(mac(data)),
        battery_percent: data[9],
        battery_mv: u16::from_be_bytes([data[10], data[11]]),
        temperature: f64::from(temperature) / 10.0,
        humidity: f64::from(data[8]),
        counter: data[12],
        flags: None,
    }
}

impl SensorReading {
    /// Serialize the reading back into the wire layout of its format.
    ///
    /// Values are rounded to the format's resolution; the extended form is
    /// always written as exactly 15 bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mac = self.device_id.0;
        match self.format {
            PayloadFormat::Extended => {
                let mut data = Vec::with_capacity(EXTENDED_MIN_LEN);
                data.extend(mac.iter().rev());
                data.extend_from_slice(&((self.temperature * 100.0).round() as i16).to_le_bytes());
                data.extend_from_slice(&((self.humidity * 100.0).round() as i16).to_le_bytes());
                data.extend_from_slice(&self.battery_mv.to_le_bytes());
                data.push(self.battery_percent);
                data.push(self.counter);
                data.push(self.flags.map_or(0, StatusFlags::bits));
                data
            }
            PayloadFormat::Compact => {
                let mut data = Vec::with_capacity(COMPACT_LEN);
                data.extend_from_slice(&mac);
                data.extend_from_slice(&((self.temperature * 10.0).round() as i16).to_be_bytes());
                data.push(self.humidity.round() as u8);
                data.push(self.battery_percent);
                data.extend_from_slice(&self.battery_mv.to_be_bytes());
                data.push(self.counter);
                data
            }
        }
    }
}
