//! Aggregation views
//!
//! Every view is a pure function from its inputs to a freshly sorted row
//! vector. Workload ids are ordered numerically so that `9` sorts before
//! `10`.

use crate::membership::Membership;
use crate::models::{ClusterResource, DiskRecord, NodeNetwork, StorageStatus};
use crate::units::bytes_to_mib;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A row as rendered: column name -> value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Rows with a fixed column order
pub trait Tabular: Serialize {
    const HEADERS: &'static [&'static str];
}

/// How a view is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One mapping per row
    Records,
    /// A single column of plain values
    List,
}

/// Header list plus rows, ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub layout: Layout,
}

impl View {
    /// Build a view from typed rows
    pub fn from_rows<T: Tabular>(rows: &[T]) -> Result<Self, serde_json::Error> {
        let rows = rows
            .iter()
            .map(|row| {
                serde_json::to_value(row).map(|value| match value {
                    serde_json::Value::Object(map) => map,
                    _ => Row::new(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            headers: T::HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
            layout: Layout::Records,
        })
    }

    /// Build a single-column list view
    pub fn list(header: &str, values: Vec<String>) -> Self {
        let rows = values
            .into_iter()
            .map(|value| {
                let mut row = Row::new();
                row.insert(header.to_string(), serde_json::Value::String(value));
                row
            })
            .collect();

        Self {
            headers: vec![header.to_string()],
            rows,
            layout: Layout::List,
        }
    }
}

impl Tabular for DiskRecord {
    const HEADERS: &'static [&'static str] = &[
        "cluster", "node", "vmid", "vmname", "storage", "vmdisk", "size", "size_mb",
    ];
}

/// Total disk size of one workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmTotal {
    pub cluster: String,
    pub node: String,
    pub vmid: String,
    pub vmname: Option<String>,
    #[serde(rename = "total_size_MB")]
    pub total_size_mb: u64,
}

impl Tabular for VmTotal {
    const HEADERS: &'static [&'static str] =
        &["cluster", "node", "vmid", "vmname", "total_size_MB"];
}

/// Total disk size of all workloads on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTotal {
    pub cluster: String,
    pub node: String,
    #[serde(rename = "total_size_MB")]
    pub total_size_mb: u64,
}

impl Tabular for NodeTotal {
    const HEADERS: &'static [&'static str] = &["cluster", "node", "total_size_MB"];
}

/// Disk size of one workload on one storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmStorageTotal {
    pub cluster: String,
    pub node: String,
    pub vmid: String,
    pub vmname: Option<String>,
    pub storage: String,
    #[serde(rename = "size_MB")]
    pub size_mb: u64,
}

impl Tabular for VmStorageTotal {
    const HEADERS: &'static [&'static str] =
        &["cluster", "node", "vmid", "vmname", "storage", "size_MB"];
}

/// Capacity and usage of one storage on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageUsage {
    pub cluster: String,
    pub node: String,
    pub storage: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "total_MB")]
    pub total_mb: u64,
    #[serde(rename = "used_MB")]
    pub used_mb: u64,
    #[serde(rename = "available_MB")]
    pub available_mb: u64,
    #[serde(rename = "used_%")]
    pub used_pct: String,
    #[serde(rename = "available_%")]
    pub available_pct: String,
}

impl Tabular for StorageUsage {
    const HEADERS: &'static [&'static str] = &[
        "cluster",
        "node",
        "storage",
        "type",
        "total_MB",
        "used_MB",
        "available_MB",
        "used_%",
        "available_%",
    ];
}

/// Cluster and external addresses of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterMember {
    pub cluster: String,
    pub node: String,
    pub cluster_ip: String,
    pub external_ip: String,
    pub external_cidr: String,
    pub external_gw: String,
}

impl Tabular for ClusterMember {
    const HEADERS: &'static [&'static str] = &[
        "cluster",
        "node",
        "cluster_ip",
        "external_ip",
        "external_cidr",
        "external_gw",
    ];
}

/// Sort key for workload ids: numeric ids in numeric order, anything else last
fn vmid_key(vmid: &str) -> (u64, &str) {
    (vmid.parse().unwrap_or(u64::MAX), vmid)
}

/// Every disk, sorted by node, workload, storage and volume
pub fn disk_rows(records: &[DiskRecord]) -> Vec<DiskRecord> {
    let mut rows = records.to_vec();
    rows.sort_by(|a, b| {
        (&a.node, vmid_key(&a.vmid), &a.storage, &a.vmdisk).cmp(&(
            &b.node,
            vmid_key(&b.vmid),
            &b.storage,
            &b.vmdisk,
        ))
    });
    rows
}

/// Total size per workload
///
/// If one id shows up with different node or name, the first record seen
/// decides them.
pub fn vm_totals(records: &[DiskRecord]) -> Vec<VmTotal> {
    let mut totals: HashMap<&str, VmTotal> = HashMap::new();

    for record in records {
        let total = totals
            .entry(record.vmid.as_str())
            .or_insert_with(|| VmTotal {
                cluster: record.cluster.clone(),
                node: record.node.clone(),
                vmid: record.vmid.clone(),
                vmname: record.vmname.clone(),
                total_size_mb: 0,
            });
        total.total_size_mb = total.total_size_mb.saturating_add(record.size_mb);
    }

    let mut rows: Vec<VmTotal> = totals.into_values().collect();
    rows.sort_by(|a, b| (&a.node, vmid_key(&a.vmid)).cmp(&(&b.node, vmid_key(&b.vmid))));
    rows
}

/// Total size per node
pub fn node_totals(cluster: &str, records: &[DiskRecord]) -> Vec<NodeTotal> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        let total = totals.entry(record.node.as_str()).or_default();
        *total = total.saturating_add(record.size_mb);
    }

    totals
        .into_iter()
        .map(|(node, total)| NodeTotal {
            cluster: cluster.to_string(),
            node: node.to_string(),
            total_size_mb: total,
        })
        .collect()
}

/// Total size per workload and storage
pub fn vm_storage_totals(records: &[DiskRecord]) -> Vec<VmStorageTotal> {
    type Key<'a> = (&'a str, &'a str, Option<&'a str>, &'a str);
    let mut totals: HashMap<Key<'_>, VmStorageTotal> = HashMap::new();

    for record in records {
        let key = (
            record.node.as_str(),
            record.vmid.as_str(),
            record.vmname.as_deref(),
            record.storage.as_str(),
        );
        let total = totals.entry(key).or_insert_with(|| VmStorageTotal {
            cluster: record.cluster.clone(),
            node: record.node.clone(),
            vmid: record.vmid.clone(),
            vmname: record.vmname.clone(),
            storage: record.storage.clone(),
            size_mb: 0,
        });
        total.size_mb = total.size_mb.saturating_add(record.size_mb);
    }

    let mut rows: Vec<VmStorageTotal> = totals.into_values().collect();
    rows.sort_by(|a, b| {
        (&a.node, vmid_key(&a.vmid), &a.storage, &a.vmname).cmp(&(
            &b.node,
            vmid_key(&b.vmid),
            &b.storage,
            &b.vmname,
        ))
    });
    rows
}

/// Percentage with two decimals
fn percent(value: f64) -> String {
    format!("{value:.2}")
}

/// Capacity and usage per node and storage, figures in MiB
///
/// Percentages are both `0.00` when the total is unknown or zero.
pub fn storage_rows(cluster: &str, statuses: &[StorageStatus]) -> Vec<StorageUsage> {
    let mut rows: Vec<StorageUsage> = statuses
        .iter()
        .map(|status| {
            let total_mb = bytes_to_mib(status.total_bytes);
            let used_mb = bytes_to_mib(status.used_bytes);
            let available_mb = bytes_to_mib(status.avail_bytes);

            let (used_pct, available_pct) = if total_mb > 0 {
                let used = used_mb as f64 * 100.0 / total_mb as f64;
                (used, 100.0 - used)
            } else {
                (0.0, 0.0)
            };

            StorageUsage {
                cluster: cluster.to_string(),
                node: status.node.clone(),
                storage: status.storage.clone(),
                kind: status.kind.clone(),
                total_mb,
                used_mb,
                available_mb,
                used_pct: percent(used_pct),
                available_pct: percent(available_pct),
            }
        })
        .collect();

    rows.sort_by(|a, b| (&a.node, &a.storage).cmp(&(&b.node, &b.storage)));
    rows
}

/// Cluster identity and addresses per node
///
/// The cluster name comes from corosync when available. Without any
/// corosync node entries, the external address doubles as cluster address.
pub fn cluster_members(
    status_cluster: &str,
    membership: Option<&Membership>,
    networks: &[NodeNetwork],
) -> Vec<ClusterMember> {
    let cluster = membership
        .and_then(|m| m.cluster_name.as_deref())
        .filter(|name| !name.is_empty())
        .or(Some(status_cluster).filter(|name| !name.is_empty()))
        .unwrap_or(crate::inventory::STANDALONE)
        .to_string();
    let ring_addresses = membership.map(|m| &m.nodes).filter(|nodes| !nodes.is_empty());

    let mut rows: Vec<ClusterMember> = networks
        .iter()
        .map(|network| {
            let external = network.external.as_ref();
            let external_ip = external.map(|e| e.address.clone()).unwrap_or_default();

            let cluster_ip = match ring_addresses {
                Some(nodes) => nodes.get(&network.node).cloned().unwrap_or_default(),
                None => external_ip.clone(),
            };

            ClusterMember {
                cluster: cluster.clone(),
                node: network.node.clone(),
                cluster_ip,
                external_ip,
                external_cidr: external.and_then(|e| e.cidr.clone()).unwrap_or_default(),
                external_gw: external.map(|e| e.gateway.clone()).unwrap_or_default(),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.node.cmp(&b.node));
    rows
}

/// Distinct node names hosting workloads
pub fn node_list(resources: &[ClusterResource]) -> Vec<String> {
    resources
        .iter()
        .filter_map(|r| r.node.clone())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct workload ids in numeric order
pub fn vmid_list(resources: &[ClusterResource]) -> Vec<String> {
    let ids: BTreeSet<String> = resources
        .iter()
        .filter_map(ClusterResource::vmid_string)
        .filter(|id| id != "0")
        .collect();

    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort_by(|a, b| vmid_key(a).cmp(&vmid_key(b)));
    ids
}
