//! Workload disk collection
//!
//! This module fetches the configuration of each VM and container and turns
//! its disk entries into [`DiskRecord`]s. Collection over many workloads runs
//! on a bounded task pool where one workload failing never affects the rest.

mod pool;


pub use pool::{
    collect_all, run_bounded, worker_count, CollectionReport, TaskFailure, TaskOutcome,
    DEFAULT_MAX_WORKERS,
};

use crate::diskspec;
use crate::error::CollectError;
use crate::models::{DiskRecord, WorkloadDescriptor, WorkloadKind};
use crate::source::ClusterSource;
use tracing::debug;

/// Marker of removable optical media on VM drives
const CDROM_MARKER: &str = "media=cdrom";

/// Config key prefixes that can hold VM disks
const VM_DISK_PREFIXES: &[&str] = &["scsi", "ide", "virtio"];

/// Fetch one workload's configuration and extract its disks
///
/// Workloads of unknown kind yield no records without a query. A failed
/// query is returned as an error so the caller can report it.
pub async fn collect_workload(
    source: &dyn ClusterSource,
    cluster: &str,
    workload: &WorkloadDescriptor,
) -> Result<Vec<DiskRecord>, CollectError> {
    let Some(segment) = workload.kind.api_segment() else {
        debug!(vmid = %workload.id, kind = %workload.kind, "Skipping unsupported workload kind");
        return Ok(Vec::new());
    };

    let path = format!("/nodes/{}/{}/{}/config", workload.host, segment, workload.id);
    let config = source
        .query(&path, &[])
        .await
        .map_err(|err| CollectError::Config {
            kind: workload.kind.to_string(),
            vmid: workload.id.clone(),
            node: workload.host.clone(),
            source: err,
        })?;

    let records = match config {
        Some(serde_json::Value::Object(entries)) => disks_from_config(cluster, workload, &entries),
        _ => Vec::new(),
    };

    debug!(
        vmid = %workload.id,
        node = %workload.host,
        disks = records.len(),
        "Collected workload disks"
    );
    Ok(records)
}

/// Extract disk records from a configuration mapping
pub fn disks_from_config(
    cluster: &str,
    workload: &WorkloadDescriptor,
    config: &serde_json::Map<String, serde_json::Value>,
) -> Vec<DiskRecord> {
    config
        .iter()
        .filter_map(|(key, value)| {
            let value = config_value_text(value);
            if !is_disk_candidate(&workload.kind, key, &value) {
                return None;
            }

            let disk = diskspec::parse(&value)?;
            Some(DiskRecord {
                cluster: cluster.to_string(),
                node: workload.host.clone(),
                vmid: workload.id.clone(),
                vmname: workload.name.clone(),
                storage: disk.storage,
                vmdisk: disk.volume,
                size: disk.size_text,
                size_mb: disk.size_mib,
            })
        })
        .collect()
}

/// Whether a config entry may describe a disk for this kind of workload
pub fn is_disk_candidate(kind: &WorkloadKind, key: &str, value: &str) -> bool {
    match kind {
        WorkloadKind::Vm => {
            VM_DISK_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
                && !value.contains(CDROM_MARKER)
        }
        WorkloadKind::Container => key == "rootfs" || key.starts_with("mp"),
        WorkloadKind::Other(_) => false,
    }
}

fn config_value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
