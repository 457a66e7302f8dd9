use crate::decoder::{PayloadFormat, StatusFlags};
use crate::device_id::DeviceId;
use crate::metrics::{Metric, MetricsSink};
use crate::reading::SensorReading;
use crate::scanner::{Advertisement, ENVIRONMENTAL_SENSING_UUID};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// A stable device id for unit tests.
pub const TEST_ID: DeviceId = DeviceId([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

/// Fixed receive time for deterministic timestamp gauges.
pub fn test_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

pub fn extended_reading(device_id: DeviceId) -> SensorReading {
    SensorReading {
        format: PayloadFormat::Extended,
        device_id,
        battery_percent: 75,
        battery_mv: 3172,
        temperature: 21.37,
        humidity: 45.5,
        counter: 5,
        flags: Some(StatusFlags(0x01)),
    }
}

pub fn compact_reading(device_id: DeviceId) -> SensorReading {
    SensorReading {
        format: PayloadFormat::Compact,
        device_id,
        battery_percent: 75,
        battery_mv: 3172,
        temperature: 10.0,
        humidity: 50.0,
        counter: 5,
        flags: None,
    }
}

/// An advertisement carrying the given payloads as 0x181A service data.
pub fn advertisement(name: &str, payloads: &[Vec<u8>]) -> Advertisement {
    advertisement_with(
        name,
        payloads
            .iter()
            .map(|p| (ENVIRONMENTAL_SENSING_UUID, p.clone()))
            .collect(),
    )
}

pub fn advertisement_with(name: &str, service_data: Vec<(Uuid, Vec<u8>)>) -> Advertisement {
    Advertisement {
        address: DeviceId([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
        name: name.to_string(),
        service_data,
        received_at: test_time(),
    }
}

/// A single call made against [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Increment(Metric, String),
    Set(Metric, String, f64),
}

/// Metrics sink that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<Update>>,
}

impl RecordingSink {
    pub fn updates(&self) -> Vec<Update> {
        self.updates.lock().unwrap().clone()
    }

    /// Latest value set for `metric` on `device`.
    pub fn gauge(&self, metric: Metric, device: &str) -> Option<f64> {
        self.updates().into_iter().rev().find_map(|u| match u {
            Update::Set(m, d, v) if m == metric && d == device => Some(v),
            _ => None,
        })
    }

    pub fn increments(&self, metric: Metric, device: &str) -> usize {
        self.updates()
            .iter()
            .filter(|u| matches!(u, Update::Increment(m, d) if *m == metric && d == device))
            .count()
    }
}

impl MetricsSink for RecordingSink {
    fn increment(&self, metric: Metric, device: &str) {
        self.updates
            .lock()
            .unwrap()
            .push(Update::Increment(metric, device.to_string()));
    }

    fn set(&self, metric: Metric, device: &str, value: f64) {
        self.updates
            .lock()
            .unwrap()
            .push(Update::Set(metric, device.to_string(), value));
    }
}
