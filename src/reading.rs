//! Canonical sensor reading decoded from one advertisement.

use crate::decoder::{PayloadFormat, StatusFlags};
use crate::device_id::DeviceId;
use std::fmt;

/// A reading from a BLE thermometer, normalized across payload formats.
///
/// Values are in the units the firmware reports:
/// - Temperature in degrees Celsius (0.01 resolution extended, 0.1 compact)
/// - Humidity in percent (0.01 resolution extended, whole numbers compact)
/// - Battery level in percent, battery voltage in millivolts
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Which wire layout the reading was decoded from
    pub format: PayloadFormat,
    /// Device MAC address in canonical order
    pub device_id: DeviceId,
    /// Battery charge in percent (0-100)
    pub battery_percent: u8,
    /// Battery voltage in millivolts
    pub battery_mv: u16,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Firmware measurement counter, wraps at 256
    pub counter: u8,
    /// Trigger/GPIO flags, only carried by the extended format
    pub flags: Option<StatusFlags>,
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAC: {}, Bat: {}%, Vbat: {} mV, ",
            self.device_id, self.battery_percent, self.battery_mv
        )?;
        match self.format {
            PayloadFormat::Extended => write!(
                f,
                "Temp: {:.2}°C, Humi: {:.2}%",
                self.temperature, self.humidity
            )?,
            PayloadFormat::Compact => write!(
                f,
                "Temp: {:.1}°C, Humi: {:.0}%",
                self.temperature, self.humidity
            )?,
        }
        write!(f, ", Count: {}", self.counter)?;
        if let Some(flags) = self.flags {
            write!(f, ", Flag: {flags}")?;
        }
        Ok(())
    }
}
