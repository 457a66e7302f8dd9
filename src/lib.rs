//! `ble-thermo-exporter` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, logging setup,
//! signal handling and process exit codes. The decoding and export logic lives
//! in [`crate::decoder`] and [`crate::collector`], wired together by
//! [`crate::app`] where it can be tested with an injected scanner and metrics sink.

pub mod app;
pub mod collector;
pub mod decoder;
pub mod device_id;
pub mod http;
pub mod metrics;
pub mod reading;
pub mod scanner;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use collector::Collector;
pub use decoder::{DecodeError, PayloadFormat, StatusFlags, decode};
pub use device_id::DeviceId;
pub use metrics::{Metric, MetricsSink, PrometheusSink};
pub use reading::SensorReading;
pub use scanner::{Advertisement, ENVIRONMENTAL_SENSING_UUID, ScanError};
