//! Node and workload id listings

use inventory_lib::views::{node_list, vmid_list};
use inventory_lib::{ClusterResource, View};

/// Nodes hosting at least one VM or container
pub fn nodes_view(resources: &[ClusterResource]) -> View {
    View::list("node", node_list(resources))
}

/// All VM and container ids
pub fn vmids_view(resources: &[ClusterResource]) -> View {
    View::list("vmid", vmid_list(resources))
}
