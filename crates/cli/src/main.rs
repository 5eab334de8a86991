//! PVE Storage Info CLI
//!
//! Reports disk allocations of Proxmox VE virtual machines and containers,
//! storage pool usage and cluster member addresses, using `pvesh`.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use commands::disks::DiskReport;
use commands::{cluster, disks, listing, storages};
use inventory_lib::inventory::{self, InventoryFilter};
use inventory_lib::{ClusterSource, PveshSource, RenderOptions};
use output::{print_error, print_view, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Get disk usage and storage info for Proxmox VMs/LXC
#[derive(Parser)]
#[command(name = "pve-storage-info")]
#[command(
    author,
    version,
    about = "Get disk usage and storage info for Proxmox VMs/LXC",
    long_about = None
)]
pub struct Cli {
    /// Filter by VMID list (comma-separated), e.g. 100,101,121
    #[arg(long)]
    pub vmid: Option<String>,

    /// Filter by node list (comma-separated), e.g. node1,node2
    #[arg(long)]
    pub node: Option<String>,

    /// Do not print the header line
    #[arg(long)]
    pub no_header: bool,

    /// Show total disk consumption per VM (sum of all disks, in MB)
    #[arg(long)]
    pub total_per_vm: bool,

    /// Show total disk consumption per node (sum of all VMs, in MB)
    #[arg(long)]
    pub total_per_node: bool,

    /// Show per-VM usage per storage (cluster,node,vmid,vmname,storage,size_MB)
    #[arg(long)]
    pub vm_per_storage: bool,

    /// List all nodes that have VMs/LXC in /cluster/resources
    #[arg(long)]
    pub list_nodes: bool,

    /// List all VMIDs from /cluster/resources
    #[arg(long)]
    pub list_vmids: bool,

    /// List storages per node (total/used/available MB and percentages)
    #[arg(long)]
    pub list_storages: bool,

    /// Show cluster name, node, cluster_ip (ring0_addr) and external IP/gateway info
    #[arg(long)]
    pub cluster_info: bool,

    /// Output format (defaults to the configured format, else table)
    #[arg(long, short)]
    pub output: Option<OutputFormat>,

    /// In table mode, show MB fields with human-readable sizes (GiB/TiB)
    #[arg(long)]
    pub human: bool,

    /// Number of parallel workers for pvesh calls (default: up to 8)
    #[arg(long, env = "PVESI_WORKERS")]
    pub workers: Option<usize>,

    /// Path to the pvesh binary
    #[arg(long, env = "PVESI_PVESH_PATH")]
    pub pvesh: Option<PathBuf>,

    /// Path to corosync.conf
    #[arg(long, env = "PVESI_COROSYNC_CONF")]
    pub corosync_conf: Option<PathBuf>,

    /// Enable verbose diagnostics on stderr
    #[arg(long, short)]
    pub verbose: bool,
}

/// Report selected by the flags; the first matching flag wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    ListNodes,
    ListVmids,
    ClusterInfo,
    Storages,
    Disks(DiskReport),
}

impl Cli {
    fn report(&self) -> Report {
        if self.list_nodes {
            Report::ListNodes
        } else if self.list_vmids {
            Report::ListVmids
        } else if self.cluster_info {
            Report::ClusterInfo
        } else if self.list_storages {
            Report::Storages
        } else if self.vm_per_storage {
            Report::Disks(DiskReport::PerVmStorage)
        } else if self.total_per_vm {
            Report::Disks(DiskReport::PerVm)
        } else if self.total_per_node {
            Report::Disks(DiskReport::PerNode)
        } else {
            Report::Disks(DiskReport::PerDisk)
        }
    }
}

fn init_logging(verbose: bool, log_format: config::LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = log_format == config::LogFormat::Json;

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    init_logging(cli.verbose, config.log_format);

    let pvesh = cli.pvesh.clone().unwrap_or(config.pvesh_path);
    let corosync_conf = cli.corosync_conf.clone().unwrap_or(config.corosync_conf);
    let workers = cli.workers.or(config.workers);
    let format = cli
        .output
        .map(inventory_lib::OutputFormat::from)
        .or(config.output)
        .unwrap_or_default();
    let filter = InventoryFilter::from_lists(cli.vmid.as_deref(), cli.node.as_deref());
    let options = RenderOptions {
        humanize: cli.human,
        header: !cli.no_header,
    };
    debug!(pvesh = %pvesh.display(), ?format, ?workers, "Configured");

    let source: Arc<dyn ClusterSource> = Arc::new(PveshSource::with_binary(pvesh));

    let cluster = inventory::cluster_name(source.as_ref())
        .await
        .context("Error running pvesh /cluster/status")?;
    let resources = inventory::cluster_resources(source.as_ref())
        .await
        .context("Error running pvesh /cluster/resources")?;

    let view = match cli.report() {
        Report::ListNodes => listing::nodes_view(&resources),
        Report::ListVmids => listing::vmids_view(&resources),
        Report::ClusterInfo => {
            cluster::cluster_view(source, &cluster, &corosync_conf, &filter, workers).await?
        }
        Report::Storages => storages::storage_view(source, &cluster, &filter, workers).await?,
        Report::Disks(report) => {
            disks::disk_view(source, &cluster, &resources, &filter, workers, report).await?
        }
    };

    print_view(&view, format, options)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("pve-storage-info").chain(args.iter().copied()))
    }

    #[test]
    fn test_default_report_is_per_disk() {
        assert_eq!(parse(&[]).report(), Report::Disks(DiskReport::PerDisk));
    }

    #[test]
    fn test_report_precedence() {
        assert_eq!(
            parse(&["--total-per-node", "--total-per-vm"]).report(),
            Report::Disks(DiskReport::PerVm)
        );
        assert_eq!(
            parse(&["--total-per-vm", "--vm-per-storage"]).report(),
            Report::Disks(DiskReport::PerVmStorage)
        );
        assert_eq!(parse(&["--list-storages", "--cluster-info"]).report(), Report::ClusterInfo);
        assert_eq!(parse(&["--list-vmids", "--list-nodes"]).report(), Report::ListNodes);
    }

    #[test]
    fn test_output_and_filters() {
        let cli = parse(&["--output", "csv", "--vmid", "100,101", "--workers", "3"]);
        assert_eq!(cli.output, Some(OutputFormat::Csv));
        assert_eq!(cli.vmid.as_deref(), Some("100,101"));
        assert_eq!(cli.workers, Some(3));
    }
}
