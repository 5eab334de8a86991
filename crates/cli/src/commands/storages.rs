//! Storage pool capacity report

use anyhow::{Context, Result};
use inventory_lib::collector::worker_count;
use inventory_lib::inventory::{node_names, storage_statuses, InventoryFilter};
use inventory_lib::views::storage_rows;
use inventory_lib::{ClusterSource, View};
use std::sync::Arc;

/// Capacity and usage of every storage on every (filtered) node
pub async fn storage_view(
    source: Arc<dyn ClusterSource>,
    cluster: &str,
    filter: &InventoryFilter,
    workers: Option<usize>,
) -> Result<View> {
    let nodes = node_names(source.as_ref(), filter)
        .await
        .context("Error running pvesh /nodes")?;

    let workers = worker_count(workers, nodes.len());
    let statuses = storage_statuses(source, nodes, workers).await;

    Ok(View::from_rows(&storage_rows(cluster, &statuses))?)
}
