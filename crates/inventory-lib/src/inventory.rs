//! Cluster inventory queries
//!
//! Foundational queries (cluster status, resources, node list) propagate
//! their errors: without them there is nothing to report. Per-node storage
//! and network queries are isolated and only logged.

use crate::collector::{run_bounded, TaskFailure};
use crate::error::QueryError;
use crate::models::{
    ClusterResource, ClusterStatusEntry, NetworkInterface, NodeEntry, NodeNetwork, StorageEntry,
    StorageStatus, WorkloadDescriptor, WorkloadKind,
};
use crate::network::select_external_address;
use crate::source::{query_list, ClusterSource};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cluster name used when the node is not part of a cluster
pub const STANDALONE: &str = "standalone";

/// Optional workload id and node filters; empty means "everything"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub vmids: BTreeSet<String>,
    pub nodes: BTreeSet<String>,
}

impl InventoryFilter {
    /// Build from comma-separated lists such as `100,101` and `pve1,pve2`
    pub fn from_lists(vmids: Option<&str>, nodes: Option<&str>) -> Self {
        Self {
            vmids: vmids.map(split_list).unwrap_or_default(),
            nodes: nodes.map(split_list).unwrap_or_default(),
        }
    }

    pub fn allows_vmid(&self, vmid: &str) -> bool {
        self.vmids.is_empty() || self.vmids.contains(vmid)
    }

    pub fn allows_node(&self, node: &str) -> bool {
        self.nodes.is_empty() || self.nodes.contains(node)
    }
}

fn split_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Name of the cluster from `/cluster/status`, or `standalone`
pub async fn cluster_name(source: &dyn ClusterSource) -> Result<String, QueryError> {
    let entries: Vec<ClusterStatusEntry> = query_list(source, "/cluster/status", &[]).await?;

    let name = entries
        .into_iter()
        .find(|e| e.kind.as_deref() == Some("cluster"))
        .and_then(|e| e.name)
        .unwrap_or_else(|| STANDALONE.to_string());

    Ok(name)
}

/// VM and container entries from `/cluster/resources`
pub async fn cluster_resources(
    source: &dyn ClusterSource,
) -> Result<Vec<ClusterResource>, QueryError> {
    query_list(source, "/cluster/resources", &[("type", "vm")]).await
}

/// Turn resource entries into workload descriptors, applying the filter
///
/// Entries without an id or node are skipped.
pub fn workload_descriptors(
    resources: &[ClusterResource],
    filter: &InventoryFilter,
) -> Vec<WorkloadDescriptor> {
    resources
        .iter()
        .filter_map(|resource| {
            let id = resource.vmid_string()?;
            let host = resource.node.clone()?;
            if !filter.allows_vmid(&id) || !filter.allows_node(&host) {
                return None;
            }
            Some(WorkloadDescriptor {
                id,
                host,
                kind: WorkloadKind::from(resource.kind.as_deref().unwrap_or_default()),
                name: resource.name.clone(),
            })
        })
        .collect()
}

/// Node names from `/nodes`, filtered
pub async fn node_names(
    source: &dyn ClusterSource,
    filter: &InventoryFilter,
) -> Result<Vec<String>, QueryError> {
    let entries: Vec<NodeEntry> = query_list(source, "/nodes", &[]).await?;

    Ok(entries
        .into_iter()
        .filter_map(|e| e.node)
        .filter(|n| !n.is_empty() && filter.allows_node(n))
        .collect())
}

#[derive(Debug, Deserialize)]
struct StorageStatusDoc {
    #[serde(default)]
    total: Option<serde_json::Value>,
    #[serde(default)]
    used: Option<serde_json::Value>,
    #[serde(default)]
    avail: Option<serde_json::Value>,
}

/// Byte count from a JSON number, absent or null meaning 0
fn byte_count(value: Option<&serde_json::Value>) -> u64 {
    value
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
        .unwrap_or(0)
}

/// Status of every storage on every given node
///
/// A node whose storage list cannot be read, or a storage whose status
/// cannot be read, is logged and left out.
pub async fn storage_statuses(
    source: Arc<dyn ClusterSource>,
    nodes: Vec<String>,
    workers: usize,
) -> Vec<StorageStatus> {
    let outcomes = run_bounded(nodes, workers, |node: String| {
        let source = source.clone();
        async move { node_storage_statuses(source.as_ref(), &node).await }
    })
    .await;

    let mut statuses = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(mut node_statuses) => statuses.append(&mut node_statuses),
            Err(TaskFailure::Failed(e)) => {
                warn!(node = %outcome.item, error = %e, "Cannot get storage list for node");
            }
            Err(TaskFailure::Panicked(reason)) => {
                warn!(node = %outcome.item, reason = %reason, "Storage query task aborted");
            }
        }
    }
    statuses
}

async fn node_storage_statuses(
    source: &dyn ClusterSource,
    node: &str,
) -> Result<Vec<StorageStatus>, QueryError> {
    let storages: Vec<StorageEntry> =
        query_list(source, &format!("/nodes/{node}/storage"), &[]).await?;

    let mut statuses = Vec::with_capacity(storages.len());
    for entry in storages {
        let Some(storage) = entry.storage.filter(|s| !s.is_empty()) else {
            continue;
        };

        let path = format!("/nodes/{node}/storage/{storage}/status");
        let doc = match source.query(&path, &[]).await {
            Ok(Some(value)) => value,
            Ok(None) => continue,
            Err(e) => {
                warn!(node = %node, storage = %storage, error = %e, "Cannot get storage status");
                continue;
            }
        };

        let doc: StorageStatusDoc = match serde_json::from_value(doc) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(node = %node, storage = %storage, error = %e, "Unexpected storage status");
                continue;
            }
        };

        statuses.push(StorageStatus {
            node: node.to_string(),
            storage,
            kind: entry.kind.unwrap_or_default(),
            total_bytes: byte_count(doc.total.as_ref()),
            used_bytes: byte_count(doc.used.as_ref()),
            avail_bytes: byte_count(doc.avail.as_ref()),
        });
    }

    debug!(node = %node, storages = statuses.len(), "Collected storage status");
    Ok(statuses)
}

/// External address of every given node
///
/// A node whose interfaces cannot be read is reported without an address.
pub async fn node_networks(
    source: Arc<dyn ClusterSource>,
    nodes: Vec<String>,
    workers: usize,
) -> Vec<NodeNetwork> {
    let outcomes = run_bounded(nodes, workers, |node: String| {
        let source = source.clone();
        async move {
            let interfaces: Vec<NetworkInterface> =
                query_list(source.as_ref(), &format!("/nodes/{node}/network"), &[]).await?;
            Ok::<_, QueryError>(select_external_address(&interfaces))
        }
    })
    .await;

    outcomes
        .into_iter()
        .map(|outcome| {
            let external = match outcome.result {
                Ok(external) => external,
                Err(TaskFailure::Failed(e)) => {
                    warn!(node = %outcome.item, error = %e, "Cannot get network info for node");
                    None
                }
                Err(TaskFailure::Panicked(reason)) => {
                    warn!(node = %outcome.item, reason = %reason, "Network query task aborted");
                    None
                }
            };
            NodeNetwork {
                node: outcome.item,
                external,
            }
        })
        .collect()
}
