//! Advertisement collector: service-data filter, decode, and metric updates.

use crate::decoder;
use crate::metrics::{Metric, MetricsSink};
use crate::reading::SensorReading;
use crate::scanner::{Advertisement, ENVIRONMENTAL_SENSING_UUID};
use std::time::SystemTime;

/// Turns advertisements into per-device metric updates on an injected sink.
#[derive(Debug)]
pub struct Collector<S> {
    sink: S,
}

impl<S: MetricsSink> Collector<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handle one advertisement.
    ///
    /// Every 0x181A service-data entry is decoded independently. Decoded readings
    /// are logged and forwarded; rejected payloads are logged at debug level and
    /// dropped without touching the sink.
    pub fn handle_advertisement(&self, advertisement: &Advertisement) {
        for payload in advertisement.service_data_for(ENVIRONMENTAL_SENSING_UUID) {
            match decoder::decode(payload) {
                Ok(reading) => {
                    log::info!("Name: {}, {}", advertisement.name, reading);
                    self.forward(&reading, advertisement.received_at);
                }
                Err(e) => {
                    log::debug!(
                        "Name: {}, Address: {}: {e}",
                        advertisement.name,
                        advertisement.address.to_colon_string()
                    );
                }
            }
        }
    }

    /// Issue one update per metric, all labeled with the reading's device id.
    fn forward(&self, reading: &SensorReading, received_at: SystemTime) {
        let device = reading.device_id.to_string();
        let timestamp = received_at
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        self.sink.increment(Metric::AdvCount, &device);
        self.sink.set(Metric::Timestamp, &device, timestamp as f64);
        self.sink.set(Metric::Temperature, &device, reading.temperature);
        self.sink.set(Metric::Humidity, &device, reading.humidity);
        self.sink
            .set(Metric::BatteryMillivolts, &device, f64::from(reading.battery_mv));
        self.sink
            .set(Metric::Battery, &device, f64::from(reading.battery_percent));
        self.sink
            .set(Metric::MeasurementCount, &device, f64::from(reading.counter));
    }
}
