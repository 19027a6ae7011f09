//! Health status collector.

use super::{category_or_kind, collect_with_handler, CollectionContext, Collector, CycleReport};
use crate::inventory::{HealthStatus, ResourceKind};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Sets `oneview_resource_status` for every status bucket of enclosures,
/// server hardware and SAS interconnects.
///
/// Interconnects are skipped: their collection does not accept a status
/// filter.
pub struct StatusCollector {
    ctx: CollectionContext,
    interval: Duration,
}

impl StatusCollector {
    pub fn new(ctx: CollectionContext, interval: Duration) -> Self {
        Self { ctx, interval }
    }
}

#[async_trait]
impl Collector for StatusCollector {
    fn name(&self) -> &'static str {
        "status"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn context(&self) -> &CollectionContext {
        &self.ctx
    }

    async fn collect_once(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for bucket in HealthStatus::ALL {
            for kind in ResourceKind::ALL
                .into_iter()
                .filter(|kind| kind.supports_status_filter())
            {
                let status = collect_with_handler(
                    &format!("{} with status {}", kind, bucket),
                    self.ctx.count(kind, Some(bucket)),
                    |count| {
                        let category = category_or_kind(&count.category, kind);
                        debug!("{} with status {}: {}", category, bucket, count.total);
                        self.ctx
                            .metrics
                            .set_resource_status(&category, bucket.as_str(), count.total);
                    },
                )
                .await;
                report.record(status);
            }
        }

        report
    }
}
