//! Metrics sink abstraction.
//!
//! The collector never touches global metric state. It is handed a
//! [`MetricsSink`] at construction and issues single increment/set calls,
//! each labeled by device id. [`prometheus::PrometheusSink`] is the
//! implementation served over HTTP; tests use a recording fake.

pub mod prometheus;

pub use self::prometheus::PrometheusSink;

/// The series exported per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Number of advertisements received (counter)
    AdvCount,
    /// Unix timestamp of the latest advertisement
    Timestamp,
    /// Temperature in degrees Celsius
    Temperature,
    /// Relative humidity in percent
    Humidity,
    /// Battery level in percent
    Battery,
    /// Battery voltage in millivolts
    BatteryMillivolts,
    /// Firmware measurement counter
    MeasurementCount,
}

impl Metric {
    /// Every metric, counter first.
    pub const ALL: [Metric; 7] = [
        Metric::AdvCount,
        Metric::Timestamp,
        Metric::Temperature,
        Metric::Humidity,
        Metric::Battery,
        Metric::BatteryMillivolts,
        Metric::MeasurementCount,
    ];

    /// Short metric name, without namespace or subsystem.
    pub fn name(self) -> &'static str {
        match self {
            Metric::AdvCount => "adv_count",
            Metric::Timestamp => "ts",
            Metric::Temperature => "temp",
            Metric::Humidity => "humidity",
            Metric::Battery => "battery",
            Metric::BatteryMillivolts => "battery_mv",
            Metric::MeasurementCount => "measurement_count",
        }
    }

    /// Subsystem the metric is grouped under.
    pub fn subsystem(self) -> &'static str {
        match self {
            Metric::AdvCount | Metric::Timestamp => "exporter",
            _ => "sensor",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Metric::AdvCount => "Number of advertisements received",
            Metric::Timestamp => "Unix timestamp of the latest advertisement",
            Metric::Temperature => "Temperature in Degrees Celsius",
            Metric::Humidity => "Relative Humidity Percentage",
            Metric::Battery => "Battery Percentage",
            Metric::BatteryMillivolts => "Battery Millivolts",
            Metric::MeasurementCount => "Measurement Count",
        }
    }

    /// Whether the metric only ever increases.
    pub fn is_counter(self) -> bool {
        matches!(self, Metric::AdvCount)
    }
}

/// Destination for labeled observations.
///
/// Implementations must be safe to share between the scan loop and the
/// HTTP server. Both methods are infallible from the caller's point of view.
pub trait MetricsSink: Send + Sync {
    /// Add one to a counter series for `device`.
    fn increment(&self, metric: Metric, device: &str);

    /// Overwrite a gauge series for `device` with `value`.
    fn set(&self, metric: Metric, device: &str, value: f64);
}
