//! Metrics Collectors
//!
//! Each collector polls one slice of the OneView inventory on its own
//! cadence and writes the results into the shared [`ExporterMetrics`].
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Own a [`CollectionContext`] with their own authenticated client
//! - Run one cycle in [`Collector::collect_once`], calling the client
//!   sequentially and updating gauges as responses arrive
//! - Sleep for their interval after each cycle (the sleep does not
//!   subtract the time the cycle took)
//!
//! # Error Handling
//!
//! A failed call is logged and skipped; the rest of the cycle still runs and
//! the next cycle acts as the retry. Every call is bounded by a deadline so a
//! hung appliance cannot stall a collector forever.

use crate::client::OneViewClient;
use crate::config::Settings;
use crate::error::{OneViewError, Result};
use crate::inventory::{
    HealthStatus, InventoryClient, ResourceCount, ResourceKind, ResourceList, Utilization,
};
use crate::metrics::ExporterMetrics;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub mod count;
pub mod enclosure;
pub mod server;
pub mod status;
mod utilization;

pub use count::CountCollector;
pub use enclosure::EnclosureUtilizationCollector;
pub use server::ServerUtilizationCollector;
pub use status::StatusCollector;

/// State owned by one collector task.
#[derive(Clone)]
pub struct CollectionContext {
    /// Client used for every call this collector makes
    pub client: Arc<dyn InventoryClient>,
    /// Registry the collector writes to
    pub metrics: ExporterMetrics,
    /// Deadline applied to each client call
    pub call_timeout: Duration,
}

impl CollectionContext {
    pub fn new(
        client: Arc<dyn InventoryClient>,
        metrics: ExporterMetrics,
        call_timeout: Duration,
    ) -> Self {
        Self {
            client,
            metrics,
            call_timeout,
        }
    }

    /// Count a resource collection, bounded by the call deadline.
    pub async fn count(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourceCount> {
        let operation = match status {
            Some(status) => format!("counting {} with status {}", kind, status),
            None => format!("counting {}", kind),
        };
        with_deadline(
            &operation,
            self.call_timeout,
            self.client.count_resources(kind, status),
        )
        .await
    }

    /// List a resource collection, bounded by the call deadline.
    pub async fn list(&self, kind: ResourceKind) -> Result<ResourceList> {
        with_deadline(
            &format!("listing {}", kind),
            self.call_timeout,
            self.client.list_resources(kind, None),
        )
        .await
    }

    /// Fetch utilization for one resource, bounded by the call deadline.
    pub async fn utilization(&self, uri: &str) -> Result<Utilization> {
        with_deadline(
            &format!("fetching utilization of {}", uri),
            self.call_timeout,
            self.client.fetch_utilization(uri),
        )
        .await
    }
}

/// Status of a single client call within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Call succeeded and gauges were updated
    Success,
    /// Call failed; already logged
    Failed,
}

/// Tally of one cycle's calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl CycleReport {
    pub fn record(&mut self, status: CollectionStatus) {
        match status {
            CollectionStatus::Success => self.succeeded += 1,
            CollectionStatus::Failed => self.failed += 1,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.failed == 0
    }
}

/// A periodically scheduled collection task.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs and the `collector` label.
    fn name(&self) -> &'static str;

    /// Sleep between the end of one cycle and the start of the next.
    fn interval(&self) -> Duration;

    fn context(&self) -> &CollectionContext;

    /// Run a single cycle.
    async fn collect_once(&self) -> CycleReport;
}

/// Await `call`, failing with [`OneViewError::Timeout`] once `deadline` passes.
pub async fn with_deadline<T, F>(operation: &str, deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(OneViewError::Timeout {
            operation: operation.to_string(),
            seconds: deadline.as_secs(),
        }),
    }
}

/// Await a client call and hand its result to `process`.
///
/// - On success: runs `process`, returns [`CollectionStatus::Success`]
/// - On error: logs a warning, returns [`CollectionStatus::Failed`]
pub async fn collect_with_handler<T, F, P>(name: &str, call: F, process: P) -> CollectionStatus
where
    F: Future<Output = Result<T>>,
    P: FnOnce(T),
{
    match call.await {
        Ok(data) => {
            process(data);
            CollectionStatus::Success
        }
        Err(e) => {
            warn!("Failed to query {}: {}", name, e);
            CollectionStatus::Failed
        }
    }
}

/// The appliance's category label, or the kind's own name when it sent none.
pub(crate) fn category_or_kind(category: &str, kind: ResourceKind) -> String {
    if category.is_empty() {
        kind.to_string()
    } else {
        category.to_string()
    }
}

/// Run `collector` forever: poll, record the outcome, sleep, repeat.
pub async fn run_collector<C: Collector + ?Sized>(collector: &C) {
    let name = collector.name();
    info!(
        "Starting {} collector (interval {}s)",
        name,
        collector.interval().as_secs()
    );

    loop {
        let report = collector.collect_once().await;
        collector
            .context()
            .metrics
            .record_cycle(name, report.is_healthy());

        if report.is_healthy() {
            info!("{} cycle finished: {} calls", name, report.succeeded);
        } else {
            warn!(
                "{} cycle finished with {} failed of {} calls",
                name,
                report.failed,
                report.succeeded + report.failed
            );
        }

        tokio::time::sleep(collector.interval()).await;
    }
}

/// Spawn `collector` on the runtime. The task is never joined.
pub fn spawn_collector<C: Collector + 'static>(collector: C) -> JoinHandle<()> {
    tokio::spawn(async move { run_collector(&collector).await })
}

/// Spawn all four collectors, each with its own OneView session.
pub fn spawn_all(settings: &Settings, metrics: &ExporterMetrics) -> Result<Vec<JoinHandle<()>>> {
    let inventory_interval = settings.collector.inventory_interval();
    let utilization_interval = settings.collector.utilization_interval();

    let handles = vec![
        spawn_logged_in(settings, metrics, |ctx| {
            CountCollector::new(ctx, inventory_interval)
        })?,
        spawn_logged_in(settings, metrics, |ctx| {
            StatusCollector::new(ctx, inventory_interval)
        })?,
        spawn_logged_in(settings, metrics, |ctx| {
            EnclosureUtilizationCollector::new(ctx, utilization_interval)
        })?,
        spawn_logged_in(settings, metrics, |ctx| {
            ServerUtilizationCollector::new(ctx, utilization_interval)
        })?,
    ];

    Ok(handles)
}

fn spawn_logged_in<C, B>(
    settings: &Settings,
    metrics: &ExporterMetrics,
    build: B,
) -> Result<JoinHandle<()>>
where
    C: Collector + 'static,
    B: FnOnce(CollectionContext) -> C,
{
    let client = Arc::new(OneViewClient::new(settings.oneview.clone())?);
    let ctx = CollectionContext::new(
        client.clone(),
        metrics.clone(),
        settings.oneview.timeout(),
    );
    let collector = build(ctx);

    Ok(tokio::spawn(async move {
        // A failed login is retried lazily by the first call of the cycle.
        if let Err(e) = client.login().await {
            error!("{} collector could not log in: {}", collector.name(), e);
        }
        run_collector(&collector).await;
    }))
}
