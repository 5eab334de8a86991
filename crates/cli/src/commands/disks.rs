//! Disk allocation reports

use anyhow::Result;
use inventory_lib::collector::collect_all;
use inventory_lib::inventory::{workload_descriptors, InventoryFilter};
use inventory_lib::views::{disk_rows, node_totals, vm_storage_totals, vm_totals};
use inventory_lib::{ClusterResource, ClusterSource, View};
use std::sync::Arc;
use tracing::info;

/// Which aggregation of the disk records to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskReport {
    /// One row per disk
    PerDisk,
    /// Total per VM/container
    PerVm,
    /// Total per node
    PerNode,
    /// Total per VM/container and storage
    PerVmStorage,
}

/// Collect all workload disks and aggregate them
pub async fn disk_view(
    source: Arc<dyn ClusterSource>,
    cluster: &str,
    resources: &[ClusterResource],
    filter: &InventoryFilter,
    workers: Option<usize>,
    report: DiskReport,
) -> Result<View> {
    let workloads = workload_descriptors(resources, filter);
    let collection = collect_all(source, cluster, workloads, workers).await;

    info!(
        disks = collection.records.len(),
        failed_workloads = collection.failures.len(),
        "Disk inventory collected"
    );

    let records = collection.records;
    let view = match report {
        DiskReport::PerDisk => View::from_rows(&disk_rows(&records))?,
        DiskReport::PerVm => View::from_rows(&vm_totals(&records))?,
        DiskReport::PerNode => View::from_rows(&node_totals(cluster, &records))?,
        DiskReport::PerVmStorage => View::from_rows(&vm_storage_totals(&records))?,
    };

    Ok(view)
}
