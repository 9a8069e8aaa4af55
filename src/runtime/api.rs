//! API-facing read models for status reporting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::core::{AsyncQueue, JobQueue, QueueStats, QueueStatus, Spawn};

/// Status and counters of one named queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    /// Queue identifier.
    pub name: String,
    /// Configured concurrency limit.
    pub concurrency_limit: usize,
    /// Configured retry limit.
    pub retry_limit: u32,
    /// Live status, when the queue is running.
    pub status: Option<QueueStatus>,
    /// Lifetime counters, when the queue is running.
    pub stats: Option<QueueStats>,
}

/// Snapshot every running queue, sorted by name.
pub fn snapshot_queues<T, Q, S>(queues: &HashMap<String, AsyncQueue<T, Q, S>>) -> Vec<QueueSnapshot>
where
    T: Send + 'static,
    Q: JobQueue<T>,
    S: Spawn + Send + Sync + 'static,
{
    let mut out: Vec<_> = queues
        .iter()
        .map(|(name, queue)| {
            let limits = queue.limits();
            QueueSnapshot {
                name: name.clone(),
                concurrency_limit: limits.concurrency_limit,
                retry_limit: limits.retry_limit,
                status: Some(queue.status()),
                stats: Some(queue.stats()),
            }
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Build queue listings from a config snapshot, sorted by name.
pub fn list_queues(cfg: &SchedulerConfig) -> Vec<QueueSnapshot> {
    let mut out: Vec<_> = cfg
        .queues
        .iter()
        .map(|(name, queue)| QueueSnapshot {
            name: name.clone(),
            concurrency_limit: queue.concurrency_limit,
            retry_limit: queue.retry_limit,
            status: None,
            stats: None,
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
