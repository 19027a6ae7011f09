//! Server hardware utilization collector.

use super::utilization::{collect_instances, MetricSlot};
use super::{CollectionContext, Collector, CycleReport};
use crate::inventory::ResourceKind;
use async_trait::async_trait;
use std::time::Duration;

/// Ambient temperature, power and CPU telemetry per server.
pub struct ServerUtilizationCollector {
    ctx: CollectionContext,
    interval: Duration,
}

impl ServerUtilizationCollector {
    pub fn new(ctx: CollectionContext, interval: Duration) -> Self {
        Self { ctx, interval }
    }
}

#[async_trait]
impl Collector for ServerUtilizationCollector {
    fn name(&self) -> &'static str {
        "server_utilization"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn context(&self) -> &CollectionContext {
        &self.ctx
    }

    async fn collect_once(&self) -> CycleReport {
        let gauges = &self.ctx.metrics.server;
        let slots = [
            MetricSlot {
                metric: "AmbientTemperature",
                gauge: &gauges.ambient_temperature,
            },
            MetricSlot {
                metric: "AveragePower",
                gauge: &gauges.average_power,
            },
            MetricSlot {
                metric: "CpuAverageFreq",
                gauge: &gauges.cpu_frequency,
            },
            MetricSlot {
                metric: "CpuUtilization",
                gauge: &gauges.cpu_utilization,
            },
            MetricSlot {
                metric: "PeakPower",
                gauge: &gauges.peak_power,
            },
        ];

        collect_instances(&self.ctx, ResourceKind::ServerHardware, &slots).await
    }
}
