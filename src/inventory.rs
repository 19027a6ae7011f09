//! Inventory domain types and the client seam the collectors poll through.

use crate::error::{OneViewError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of managed resource that is counted or measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Enclosures,
    ServerHardware,
    Interconnects,
    SasInterconnects,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Enclosures,
        ResourceKind::ServerHardware,
        ResourceKind::Interconnects,
        ResourceKind::SasInterconnects,
    ];

    /// REST collection path on the appliance.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Enclosures => "/rest/enclosures",
            ResourceKind::ServerHardware => "/rest/server-hardware",
            ResourceKind::Interconnects => "/rest/interconnects",
            ResourceKind::SasInterconnects => "/rest/sas-interconnects",
        }
    }

    /// The interconnects collection rejects status filters.
    pub fn supports_status_filter(self) -> bool {
        !matches!(self, ResourceKind::Interconnects)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Enclosures => "enclosures",
            ResourceKind::ServerHardware => "server-hardware",
            ResourceKind::Interconnects => "interconnects",
            ResourceKind::SasInterconnects => "sas-interconnects",
        };
        f.write_str(name)
    }
}

/// Health status bucket reported by the appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthStatus {
    Ok,
    Unknown,
    Warning,
    Critical,
    Disabled,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 5] = [
        HealthStatus::Ok,
        HealthStatus::Unknown,
        HealthStatus::Warning,
        HealthStatus::Critical,
        HealthStatus::Disabled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Ok => "OK",
            HealthStatus::Unknown => "Unknown",
            HealthStatus::Warning => "Warning",
            HealthStatus::Critical => "Critical",
            HealthStatus::Disabled => "Disabled",
        }
    }

    /// Value of the `filter` query parameter selecting this bucket.
    pub fn filter(self) -> String {
        format!("'status'='{}'", self.as_str())
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One managed object (an enclosure or a server).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceMember {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    /// Resource locator, e.g. `/rest/enclosures/<id>`
    #[serde(default)]
    pub uri: String,
}

/// Result of listing a resource collection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResourceList {
    /// Total matching resources across all pages
    #[serde(default)]
    pub total: u64,
    /// Category label reported by the appliance
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub members: Vec<ResourceMember>,
}

/// Size of a resource collection, read from its first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceCount {
    pub total: u64,
    pub category: String,
}

/// A single `[timestamp, value]` pair. The value is null when the appliance
/// has no reading for the slice.
pub type MetricSample = (i64, Option<f64>);

/// One named utilization series.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationMetric {
    pub metric_name: String,
    #[serde(default)]
    pub metric_samples: Vec<MetricSample>,
}

impl UtilizationMetric {
    /// Value of the sample with the greatest timestamp.
    pub fn latest_value(&self) -> Option<f64> {
        self.metric_samples
            .iter()
            .max_by_key(|(timestamp, _)| *timestamp)
            .and_then(|(_, value)| *value)
    }
}

/// Utilization telemetry for one resource.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Utilization {
    #[serde(default)]
    pub is_fresh: bool,
    #[serde(default)]
    pub metric_list: Vec<UtilizationMetric>,
}

impl Utilization {
    /// Latest value of the named metric.
    pub fn latest(&self, resource: &str, metric: &str) -> Result<f64> {
        self.metric_list
            .iter()
            .find(|m| m.metric_name == metric)
            .and_then(UtilizationMetric::latest_value)
            .ok_or_else(|| OneViewError::MissingMetric {
                resource: resource.to_string(),
                metric: metric.to_string(),
            })
    }
}

/// Read operations the collectors issue against the appliance.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Count the members of `kind`, optionally restricted to one status
    /// bucket. Only the first page is requested.
    async fn count_resources(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourceCount>;

    /// List every member of `kind`, optionally restricted to one status bucket.
    async fn list_resources(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourceList>;

    /// Fetch the most recent utilization sample set for the resource at `uri`.
    async fn fetch_utilization(&self, uri: &str) -> Result<Utilization>;
}
