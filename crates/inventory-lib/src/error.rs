//! Error types for cluster queries and workload collection.

use thiserror::Error;

/// Errors raised by a [`ClusterSource`](crate::source::ClusterSource).
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query binary could not be started.
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The query ran but exited unsuccessfully.
    #[error("query {path} failed ({status}): {stderr}")]
    CommandFailed {
        path: String,
        status: String,
        stderr: String,
    },

    /// The query output was not valid JSON.
    #[error("invalid JSON from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The document did not have the expected shape.
    #[error("unexpected response from {path}: {source}")]
    Shape {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while collecting the disks of one workload.
#[derive(Error, Debug)]
pub enum CollectError {
    /// Fetching the workload configuration failed.
    #[error("cannot get config for {kind} {vmid} on {node}: {source}")]
    Config {
        kind: String,
        vmid: String,
        node: String,
        #[source]
        source: QueryError,
    },

    /// The collection task itself died.
    #[error("collection task for {kind} {vmid} on {node} aborted: {reason}")]
    Aborted {
        kind: String,
        vmid: String,
        node: String,
        reason: String,
    },
}
