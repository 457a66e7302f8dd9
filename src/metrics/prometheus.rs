//! Prometheus-backed metrics sink.
//!
//! Series are namespaced `temp_<subsystem>_<name>` and labeled `mac`, e.g.
//! `temp_sensor_battery_mv{mac="A4C138010203"}`.

use super::{Metric, MetricsSink};
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::BTreeMap;

/// Namespace prefix shared by all series.
pub const NAMESPACE: &str = "temp";

/// Label carrying the device id.
pub const DEVICE_LABEL: &str = "mac";

/// A metrics sink holding its own [`Registry`].
///
/// Each sink is independent, so tests and benches can create as many as they
/// like without colliding in a process-wide default registry.
#[derive(Clone)]
pub struct PrometheusSink {
    registry: Registry,
    counters: BTreeMap<Metric, CounterVec>,
    gauges: BTreeMap<Metric, GaugeVec>,
}

impl PrometheusSink {
    /// Create the sink and register one vector per [`Metric`].
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let mut counters = BTreeMap::new();
        let mut gauges = BTreeMap::new();

        for metric in Metric::ALL {
            let opts = Opts::new(metric.name(), metric.help())
                .namespace(NAMESPACE)
                .subsystem(metric.subsystem());
            if metric.is_counter() {
                let counter = CounterVec::new(opts, &[DEVICE_LABEL])?;
                registry.register(Box::new(counter.clone()))?;
                counters.insert(metric, counter);
            } else {
                let gauge = GaugeVec::new(opts, &[DEVICE_LABEL])?;
                registry.register(Box::new(gauge.clone()))?;
                gauges.insert(metric, gauge);
            }
        }

        Ok(Self {
            registry,
            counters,
            gauges,
        })
    }

    /// Render the current snapshot in the Prometheus text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Content type of [`PrometheusSink::render`] output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}

impl MetricsSink for PrometheusSink {
    fn increment(&self, metric: Metric, device: &str) {
        let Some(counter) = self.counters.get(&metric) else {
            log::error!("{} is not a counter", metric.name());
            return;
        };
        match counter.get_metric_with_label_values(&[device]) {
            Ok(counter) => counter.inc(),
            Err(e) => log::error!("{}: {e}", metric.name()),
        }
    }

    fn set(&self, metric: Metric, device: &str, value: f64) {
        let Some(gauge) = self.gauges.get(&metric) else {
            log::error!("{} is not a gauge", metric.name());
            return;
        };
        match gauge.get_metric_with_label_values(&[device]) {
            Ok(gauge) => gauge.set(value),
            Err(e) => log::error!("{}: {e}", metric.name()),
        }
    }
}
