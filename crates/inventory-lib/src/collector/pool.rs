//! Bounded task pool
//!
//! Runs one task per item with at most `workers` tasks in flight. Each task
//! runs to completion on its own: an error or a panic in one task is
//! reported in its outcome and never cancels the others. Results are merged
//! by the caller as tasks finish.

use super::collect_workload;
use crate::error::CollectError;
use crate::models::{DiskRecord, WorkloadDescriptor};
use crate::source::ClusterSource;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Upper bound on workers when none is configured
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Why a task produced no value
#[derive(Debug)]
pub enum TaskFailure<E> {
    /// The task returned an error
    Failed(E),
    /// The task panicked or was aborted
    Panicked(String),
}

/// Result of one pooled task, paired with the item it ran on
#[derive(Debug)]
pub struct TaskOutcome<I, T, E> {
    pub item: I,
    pub result: Result<T, TaskFailure<E>>,
}

/// Number of workers for a batch of `jobs`
///
/// An explicit positive value wins; otherwise up to [`DEFAULT_MAX_WORKERS`].
pub fn worker_count(max_workers: Option<usize>, jobs: usize) -> usize {
    match max_workers {
        Some(n) if n > 0 => n,
        _ => jobs.clamp(1, DEFAULT_MAX_WORKERS),
    }
}

/// Run `task` over every item with at most `workers` running at once
///
/// Returns one outcome per item, in completion order.
pub async fn run_bounded<I, T, E, F, Fut>(
    items: Vec<I>,
    workers: usize,
    task: F,
) -> Vec<TaskOutcome<I, T, E>>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut set = JoinSet::new();

    for (index, item) in items.iter().cloned().enumerate() {
        let semaphore = semaphore.clone();
        let work = task(item);
        set.spawn(async move {
            // The semaphore is never closed, so acquiring cannot fail
            let _permit = semaphore.acquire_owned().await.ok();
            (index, tokio::spawn(work).await)
        });
    }

    let mut outcomes = Vec::with_capacity(items.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(result))) => outcomes.push(TaskOutcome {
                item: items[index].clone(),
                result: result.map_err(TaskFailure::Failed),
            }),
            Ok((index, Err(join_error))) => outcomes.push(TaskOutcome {
                item: items[index].clone(),
                result: Err(TaskFailure::Panicked(join_error.to_string())),
            }),
            // The wrapper only awaits the inner handle; it cannot panic itself
            Err(join_error) => warn!(error = %join_error, "Pool wrapper task failed"),
        }
    }

    outcomes
}

/// Merged result of collecting disks from many workloads
#[derive(Debug, Default)]
pub struct CollectionReport {
    /// Disk records from every workload that succeeded, unordered
    pub records: Vec<DiskRecord>,
    /// Isolated per-workload failures
    pub failures: Vec<CollectError>,
    /// Number of workload tasks that ran to completion
    pub tasks_run: usize,
}

/// Collect the disks of all workloads on a bounded pool
pub async fn collect_all(
    source: Arc<dyn ClusterSource>,
    cluster: &str,
    workloads: Vec<WorkloadDescriptor>,
    max_workers: Option<usize>,
) -> CollectionReport {
    let workers = worker_count(max_workers, workloads.len());
    info!(workloads = workloads.len(), workers, "Collecting workload disks");

    let cluster: Arc<str> = Arc::from(cluster);
    let outcomes = run_bounded(workloads, workers, |workload: WorkloadDescriptor| {
        let source = source.clone();
        let cluster = cluster.clone();
        async move { collect_workload(source.as_ref(), &cluster, &workload).await }
    })
    .await;

    let mut report = CollectionReport::default();
    for outcome in outcomes {
        report.tasks_run += 1;
        let workload = outcome.item;
        match outcome.result {
            Ok(mut records) => report.records.append(&mut records),
            Err(failure) => {
                let error = match failure {
                    TaskFailure::Failed(error) => error,
                    TaskFailure::Panicked(reason) => CollectError::Aborted {
                        kind: workload.kind.to_string(),
                        vmid: workload.id.clone(),
                        node: workload.host.clone(),
                        reason,
                    },
                };
                warn!(
                    kind = %workload.kind,
                    vmid = %workload.id,
                    node = %workload.host,
                    error = %error,
                    "Failed to collect workload disks"
                );
                report.failures.push(error);
            }
        }
    }

    debug!(
        records = report.records.len(),
        failures = report.failures.len(),
        tasks = report.tasks_run,
        "Collection complete"
    );
    report
}
