//! Cluster member report

use anyhow::{Context, Result};
use inventory_lib::collector::worker_count;
use inventory_lib::inventory::{node_names, node_networks, InventoryFilter};
use inventory_lib::membership::load_membership;
use inventory_lib::views::cluster_members;
use inventory_lib::{ClusterSource, View};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Cluster name, cluster address and external address of every node
pub async fn cluster_view(
    source: Arc<dyn ClusterSource>,
    cluster: &str,
    corosync_conf: &Path,
    filter: &InventoryFilter,
    workers: Option<usize>,
) -> Result<View> {
    let membership = load_membership(corosync_conf).await;
    debug!(
        path = %corosync_conf.display(),
        found = membership.is_some(),
        "Read corosync membership"
    );

    let nodes = node_names(source.as_ref(), filter)
        .await
        .context("Error running pvesh /nodes")?;

    let workers = worker_count(workers, nodes.len());
    let networks = node_networks(source, nodes, workers).await;

    Ok(View::from_rows(&cluster_members(
        cluster,
        membership.as_ref(),
        &networks,
    ))?)
}
