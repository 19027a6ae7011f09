//! In-memory inventory used by the collector and server tests.

#![allow(dead_code)]

use async_trait::async_trait;
use oneview_exporter::collectors::CollectionContext;
use oneview_exporter::error::{OneViewError, Result};
use oneview_exporter::inventory::{
    HealthStatus, InventoryClient, ResourceCount, ResourceKind, ResourceList, ResourceMember,
    Utilization, UtilizationMetric,
};
use oneview_exporter::metrics::ExporterMetrics;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted responses keyed by (kind, status) and by utilization uri.
#[derive(Default)]
pub struct FakeInventory {
    lists: Mutex<HashMap<(ResourceKind, Option<HealthStatus>), ResourceList>>,
    utilization: Mutex<HashMap<String, Utilization>>,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    /// Collection requests, counted or listed
    pub list_calls: AtomicUsize,
    pub utilization_calls: AtomicUsize,
}

impl FakeInventory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_list(&self, kind: ResourceKind, status: Option<HealthStatus>, list: ResourceList) {
        self.lists.lock().unwrap().insert((kind, status), list);
    }

    pub fn set_utilization(&self, uri: &str, utilization: Utilization) {
        self.utilization
            .lock()
            .unwrap()
            .insert(uri.to_string(), utilization);
    }

    /// Make calls for `key` fail. Keys are the kind display name for lists
    /// and the uri for utilization.
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    /// Make calls for `key` never complete.
    pub fn hang(&self, key: &str) {
        self.hanging.lock().unwrap().insert(key.to_string());
    }

    async fn gate(&self, key: &str) -> Result<()> {
        let hangs = self.hanging.lock().unwrap().contains(key);
        if hangs {
            std::future::pending::<()>().await;
        }
        if self.failing.lock().unwrap().contains(key) {
            return Err(OneViewError::Auth(format!("scripted failure for {}", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryClient for FakeInventory {
    async fn count_resources(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourceCount> {
        let list = self.list_resources(kind, status).await?;
        Ok(ResourceCount {
            total: list.total,
            category: list.category,
        })
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourceList> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate(&kind.to_string()).await?;
        // Yield so concurrently spawned collectors interleave.
        tokio::task::yield_now().await;
        let list = self.lists.lock().unwrap().get(&(kind, status)).cloned();
        list.ok_or_else(|| OneViewError::ParseError(format!("no scripted list for {}", kind)))
    }

    async fn fetch_utilization(&self, uri: &str) -> Result<Utilization> {
        self.utilization_calls.fetch_add(1, Ordering::SeqCst);
        self.gate(uri).await?;
        tokio::task::yield_now().await;
        let utilization = self.utilization.lock().unwrap().get(uri).cloned();
        utilization.ok_or_else(|| {
            OneViewError::ParseError(format!("no scripted utilization for {}", uri))
        })
    }
}

pub fn list(total: u64, category: &str, members: Vec<ResourceMember>) -> ResourceList {
    ResourceList {
        total,
        category: category.to_string(),
        members,
    }
}

pub fn member(uuid: &str, name: &str, uri: &str) -> ResourceMember {
    ResourceMember {
        uuid: uuid.to_string(),
        name: name.to_string(),
        uri: uri.to_string(),
    }
}

/// Fresh utilization with one sample per named metric.
pub fn fresh(metrics: &[(&str, f64)]) -> Utilization {
    Utilization {
        is_fresh: true,
        metric_list: metrics
            .iter()
            .enumerate()
            .map(|(i, (name, value))| UtilizationMetric {
                metric_name: name.to_string(),
                metric_samples: vec![(1_700_000_000_000 + i as i64, Some(*value))],
            })
            .collect(),
    }
}

pub fn stale() -> Utilization {
    Utilization {
        is_fresh: false,
        metric_list: Vec::new(),
    }
}

pub fn context(fake: &Arc<FakeInventory>, metrics: &ExporterMetrics) -> CollectionContext {
    CollectionContext::new(fake.clone(), metrics.clone(), Duration::from_secs(30))
}
