//! Report commands
//!
//! Each command turns cluster data into a [`View`](inventory_lib::View)
//! that `main` renders in the requested format.

pub mod cluster;
pub mod disks;
pub mod listing;
pub mod storages;
