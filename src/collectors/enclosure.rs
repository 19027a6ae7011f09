//! Enclosure utilization collector.

use super::utilization::{collect_instances, MetricSlot};
use super::{CollectionContext, Collector, CycleReport};
use crate::inventory::ResourceKind;
use async_trait::async_trait;
use std::time::Duration;

/// Ambient temperature, average power and peak power per enclosure.
pub struct EnclosureUtilizationCollector {
    ctx: CollectionContext,
    interval: Duration,
}

impl EnclosureUtilizationCollector {
    pub fn new(ctx: CollectionContext, interval: Duration) -> Self {
        Self { ctx, interval }
    }
}

#[async_trait]
impl Collector for EnclosureUtilizationCollector {
    fn name(&self) -> &'static str {
        "enclosure_utilization"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn context(&self) -> &CollectionContext {
        &self.ctx
    }

    async fn collect_once(&self) -> CycleReport {
        let gauges = &self.ctx.metrics.enclosure;
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
                metric: "PeakPower",
                gauge: &gauges.peak_power,
            },
        ];

        collect_instances(&self.ctx, ResourceKind::Enclosures, &slots).await
    }
}
