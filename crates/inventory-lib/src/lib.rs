//! Disk and storage inventory for Proxmox VE clusters
//!
//! This crate provides the core functionality for:
//! - Parsing disk specifications and normalizing sizes to MiB
//! - Collecting workload disks concurrently through `pvesh`
//! - Aggregating disk records into per-VM, per-node and per-storage views
//! - Storage pool and cluster member inventory
//! - Rendering views as tables, delimited text or JSON

pub mod collector;
pub mod diskspec;
pub mod error;
pub mod inventory;
pub mod membership;
pub mod models;
pub mod network;
pub mod render;
pub mod source;
pub mod units;
pub mod views;

pub use error::{CollectError, QueryError};
pub use models::*;
pub use render::{render, OutputFormat, RenderOptions};
pub use source::{ClusterSource, PveshSource};
pub use views::View;
