//! Prometheus metrics definitions.
//!
//! [`ExporterMetrics`] is the registry shared by every collector and read by
//! the `/metrics` handler. Cloning it is cheap: all gauge vectors are
//! reference counted and synchronize writes per label set internally.

use crate::error::{OneViewError, Result};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const UTILIZATION_LABELS: &[&str] = &["category", "uuid", "name"];

/// Identity labels attached to every utilization gauge.
#[derive(Debug, Clone, Copy)]
pub struct InstanceLabels<'a> {
    pub category: &'a str,
    pub uuid: &'a str,
    pub name: &'a str,
}

impl<'a> InstanceLabels<'a> {
    fn values(&self) -> [&'a str; 3] {
        [self.category, self.uuid, self.name]
    }
}

/// Per-enclosure gauges.
#[derive(Clone)]
pub struct EnclosureGauges {
    pub ambient_temperature: GaugeVec,
    pub average_power: GaugeVec,
    pub peak_power: GaugeVec,
}

/// Per-server gauges.
#[derive(Clone)]
pub struct ServerGauges {
    pub ambient_temperature: GaugeVec,
    pub average_power: GaugeVec,
    pub cpu_frequency: GaugeVec,
    pub cpu_utilization: GaugeVec,
    pub peak_power: GaugeVec,
}

/// Shared metric registry for the OneView exporter.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,

    // Inventory
    resource_count: GaugeVec,
    resource_status: GaugeVec,

    // Utilization
    pub enclosure: EnclosureGauges,
    pub server: ServerGauges,

    // Exporter health
    collector_up: GaugeVec,
    collector_last_cycle: GaugeVec,
}

fn register_gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec> {
    let gauge = GaugeVec::new(Opts::new(name, help), labels)
        .map_err(|e| OneViewError::Metrics(e.to_string()))?;
    registry
        .register(Box::new(gauge.clone()))
        .map_err(|e| OneViewError::Metrics(e.to_string()))?;
    Ok(gauge)
}

impl ExporterMetrics {
    /// Create a registry with every gauge family registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let resource_count = register_gauge_vec(
            &registry,
            "oneview_resource_count",
            "Total number of resources of the given type",
            &["resourceType"],
        )?;
        let resource_status = register_gauge_vec(
            &registry,
            "oneview_resource_status",
            "Number of resources of the given type reporting the given status",
            &["resourceType", "status"],
        )?;

        let enclosure = EnclosureGauges {
            ambient_temperature: register_gauge_vec(
                &registry,
                "oneview_enclosure_ambient_temperature_celsius",
                "Ambient temperature as reported by enclosure",
                UTILIZATION_LABELS,
            )?,
            average_power: register_gauge_vec(
                &registry,
                "oneview_enclosure_average_power_watts",
                "Average power consumption as reported by enclosure",
                UTILIZATION_LABELS,
            )?,
            peak_power: register_gauge_vec(
                &registry,
                "oneview_enclosure_peak_power_watts",
                "Peak power consumption as reported by enclosure",
                UTILIZATION_LABELS,
            )?,
        };

        let server = ServerGauges {
            ambient_temperature: register_gauge_vec(
                &registry,
                "oneview_server_ambient_temperature_celsius",
                "Ambient temperature as reported by server",
                UTILIZATION_LABELS,
            )?,
            average_power: register_gauge_vec(
                &registry,
                "oneview_server_average_power_watts",
                "Average power consumption as reported by server",
                UTILIZATION_LABELS,
            )?,
            cpu_frequency: register_gauge_vec(
                &registry,
                "oneview_server_cpu_frequency_mhz",
                "Average CPU frequency as reported by server",
                UTILIZATION_LABELS,
            )?,
            cpu_utilization: register_gauge_vec(
                &registry,
                "oneview_server_cpu_utilization_percent",
                "CPU utilization as reported by server",
                UTILIZATION_LABELS,
            )?,
            peak_power: register_gauge_vec(
                &registry,
                "oneview_server_peak_power_watts",
                "Peak power consumption as reported by server",
                UTILIZATION_LABELS,
            )?,
        };

        let collector_up = register_gauge_vec(
            &registry,
            "oneview_collector_up",
            "Whether the last cycle of the collector completed without failed calls (1 = yes, 0 = no)",
            &["collector"],
        )?;
        let collector_last_cycle = register_gauge_vec(
            &registry,
            "oneview_collector_last_cycle_timestamp_seconds",
            "Unix timestamp at which the collector last finished a cycle",
            &["collector"],
        )?;

        Ok(Self {
            registry,
            resource_count,
            resource_status,
            enclosure,
            server,
            collector_up,
            collector_last_cycle,
        })
    }

    /// Set the total count for a resource category.
    pub fn set_resource_count(&self, resource_type: &str, total: u64) {
        debug!("resource_count{{resourceType={}}} = {}", resource_type, total);
        self.resource_count
            .with_label_values(&[resource_type])
            .set(total as f64);
    }

    /// Set the count of resources in one health status bucket.
    pub fn set_resource_status(&self, resource_type: &str, status: &str, total: u64) {
        debug!(
            "resource_status{{resourceType={}, status={}}} = {}",
            resource_type, status, total
        );
        self.resource_status
            .with_label_values(&[resource_type, status])
            .set(total as f64);
    }

    /// Set one utilization gauge for an instance.
    pub fn set_instance(&self, gauge: &GaugeVec, labels: InstanceLabels<'_>, value: f64) {
        gauge.with_label_values(&labels.values()).set(value);
    }

    /// Record the outcome of a finished collector cycle.
    pub fn record_cycle(&self, collector: &str, healthy: bool) {
        self.collector_up
            .with_label_values(&[collector])
            .set(if healthy { 1.0 } else { 0.0 });

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.collector_last_cycle
            .with_label_values(&[collector])
            .set(now);
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        // Reuse buffer to avoid allocation on every scrape
        thread_local! {
            static BUFFER: std::cell::RefCell<Vec<u8>> = std::cell::RefCell::new(Vec::with_capacity(8192));
        }

        BUFFER.with(|buf| {
            let mut buffer = buf.borrow_mut();
            buffer.clear();

            encoder
                .encode(&metric_families, &mut *buffer)
                .map_err(|e| OneViewError::Metrics(e.to_string()))?;

            String::from_utf8(buffer.clone()).map_err(|e| OneViewError::Metrics(e.to_string()))
        })
    }
}
