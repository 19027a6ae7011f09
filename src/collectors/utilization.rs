//! Shared cycle for the per-instance utilization collectors.

use super::{category_or_kind, CollectionContext, CollectionStatus, CycleReport};
use crate::inventory::{ResourceKind, ResourceMember};
use crate::metrics::InstanceLabels;
use prometheus::GaugeVec;
use tracing::{debug, error, info, warn};

/// Binds a OneView metric name to the gauge it feeds.
pub(crate) struct MetricSlot<'a> {
    pub metric: &'static str,
    pub gauge: &'a GaugeVec,
}

/// List every member of `kind` and refresh its utilization gauges.
///
/// Stale data and failed fetches both zero the instance's gauges; a missing
/// metric zeroes only its own gauge.
pub(crate) async fn collect_instances(
    ctx: &CollectionContext,
    kind: ResourceKind,
    slots: &[MetricSlot<'_>],
) -> CycleReport {
    let mut report = CycleReport::default();

    let list = match ctx.list(kind).await {
        Ok(list) => list,
        Err(e) => {
            error!("Failed to list {}: {}", kind, e);
            report.record(CollectionStatus::Failed);
            return report;
        }
    };
    report.record(CollectionStatus::Success);

    let category = category_or_kind(&list.category, kind);
    for member in &list.members {
        let Some(labels) = instance_labels(&category, member) else {
            warn!("Skipping {} member without uuid: {:?}", kind, member.uri);
            report.record(CollectionStatus::Failed);
            continue;
        };
        report.record(refresh_instance(ctx, member, labels, slots).await);
    }

    report
}

fn instance_labels<'a>(
    category: &'a str,
    member: &'a ResourceMember,
) -> Option<InstanceLabels<'a>> {
    if member.uuid.is_empty() {
        return None;
    }
    let name = if member.name.is_empty() {
        &member.uuid
    } else {
        &member.name
    };
    Some(InstanceLabels {
        category,
        uuid: &member.uuid,
        name,
    })
}

async fn refresh_instance(
    ctx: &CollectionContext,
    member: &ResourceMember,
    labels: InstanceLabels<'_>,
    slots: &[MetricSlot<'_>],
) -> CollectionStatus {
    let utilization = match ctx.utilization(&member.uri).await {
        Ok(utilization) => utilization,
        Err(e) => {
            warn!("Utilization retrieval failed for {}: {}", labels.name, e);
            zero_all(ctx, labels, slots);
            return CollectionStatus::Failed;
        }
    };

    if !utilization.is_fresh {
        info!("No fresh utilization data for {}, reporting 0", labels.name);
        zero_all(ctx, labels, slots);
        return CollectionStatus::Success;
    }

    let mut status = CollectionStatus::Success;
    for slot in slots {
        let value = match utilization.latest(labels.name, slot.metric) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}", e);
                status = CollectionStatus::Failed;
                0.0
            }
        };
        debug!(
            "{} {} {}: {} = {}",
            labels.category, labels.uuid, labels.name, slot.metric, value
        );
        ctx.metrics.set_instance(slot.gauge, labels, value);
    }
    status
}

fn zero_all(ctx: &CollectionContext, labels: InstanceLabels<'_>, slots: &[MetricSlot<'_>]) {
    for slot in slots {
        ctx.metrics.set_instance(slot.gauge, labels, 0.0);
    }
}
