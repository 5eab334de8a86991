//! Core data models for the inventory

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of workload as reported by `/cluster/resources`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    /// QEMU virtual machine
    Vm,
    /// LXC container
    Container,
    /// Anything else the API may report
    Other(String),
}

impl WorkloadKind {
    /// Path segment used by the API for this kind
    pub fn api_segment(&self) -> Option<&'static str> {
        match self {
            WorkloadKind::Vm => Some("qemu"),
            WorkloadKind::Container => Some("lxc"),
            WorkloadKind::Other(_) => None,
        }
    }
}

impl From<&str> for WorkloadKind {
    fn from(value: &str) -> Self {
        match value {
            "qemu" => WorkloadKind::Vm,
            "lxc" => WorkloadKind::Container,
            other => WorkloadKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadKind::Vm => f.write_str("qemu"),
            WorkloadKind::Container => f.write_str("lxc"),
            WorkloadKind::Other(kind) => f.write_str(kind),
        }
    }
}

/// A VM or container hosted on one cluster node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadDescriptor {
    pub id: String,
    pub host: String,
    pub kind: WorkloadKind,
    pub name: Option<String>,
}

/// One disk attached to a workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskRecord {
    pub cluster: String,
    pub node: String,
    pub vmid: String,
    pub vmname: Option<String>,
    pub storage: String,
    pub vmdisk: String,
    /// Size token exactly as written in the configuration
    pub size: String,
    pub size_mb: u64,
}

/// Entry of `/cluster/status`
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterStatusEntry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Entry of `/cluster/resources --type vm`
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterResource {
    #[serde(default)]
    pub vmid: Option<serde_json::Value>,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl ClusterResource {
    /// The workload id as a string, whether the API sent a number or a string
    pub fn vmid_string(&self) -> Option<String> {
        match self.vmid.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Entry of `/nodes`
#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    #[serde(default)]
    pub node: Option<String>,
}

/// Entry of `/nodes/{node}/storage`
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEntry {
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Byte figures of one storage on one node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageStatus {
    pub node: String,
    pub storage: String,
    pub kind: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub avail_bytes: u64,
}

/// Entry of `/nodes/{node}/network`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkInterface {
    #[serde(default)]
    pub active: Option<serde_json::Value>,
    #[serde(default)]
    pub families: Option<Vec<String>>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
}

impl NetworkInterface {
    /// The API reports `active` as `1`, `true` or leaves it out
    pub fn is_active(&self) -> bool {
        match &self.active {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
            Some(serde_json::Value::String(s)) => !s.is_empty() && s != "0",
            _ => false,
        }
    }
}

/// External address of a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExternalAddress {
    pub address: String,
    pub cidr: Option<String>,
    pub gateway: String,
}

/// Network identity of one cluster node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeNetwork {
    pub node: String,
    pub external: Option<ExternalAddress>,
}
