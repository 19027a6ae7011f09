//! Resource count collector.

use super::{category_or_kind, collect_with_handler, CollectionContext, Collector, CycleReport};
use crate::inventory::ResourceKind;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Sets `oneview_resource_count` for every supported resource kind.
pub struct CountCollector {
    ctx: CollectionContext,
    interval: Duration,
}

impl CountCollector {
    pub fn new(ctx: CollectionContext, interval: Duration) -> Self {
        Self { ctx, interval }
    }
}

#[async_trait]
impl Collector for CountCollector {
    fn name(&self) -> &'static str {
        "count"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn context(&self) -> &CollectionContext {
        &self.ctx
    }

    async fn collect_once(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for kind in ResourceKind::ALL {
            let status = collect_with_handler(
                &format!("{} count", kind),
                self.ctx.count(kind, None),
                |count| {
                    let category = category_or_kind(&count.category, kind);
                    debug!("{} total: {}", category, count.total);
                    self.ctx.metrics.set_resource_count(&category, count.total);
                },
            )
            .await;
            report.record(status);
        }

        report
    }
}

