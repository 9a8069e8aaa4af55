//! Job records, outcomes and the handle returned to submitters.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::{QueueError, Task};
use crate::util::clock::now_ms;
use crate::util::serde::JobId;

/// Final outcome delivered to the submitter.
pub type JobOutcome<T> = Result<JobResponse<T>, QueueError>;

/// Successful outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse<T> {
    /// Identifier supplied at submission.
    pub id: JobId,
    /// Value produced by the successful attempt.
    pub result: T,
    /// Time from the first dispatch to settlement, across all attempts.
    #[serde(with = "crate::util::serde::millis")]
    pub execution_time: Duration,
    /// Retries consumed before the successful attempt.
    pub retries: u32,
    /// Wall-clock time of the first dispatch, milliseconds since epoch.
    pub start_time_ms: u128,
}

/// First-dispatch timestamps, kept unchanged across retries.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StartMark {
    pub wall_ms: u128,
    pub instant: Instant,
}

/// A pending or executing unit of work.
///
/// Owned by the queue store while pending and by one attempt driver while
/// running. The completion sender is consumed on settlement.
pub struct Job<T>
where
    T: Send + 'static,
{
    pub(crate) id: JobId,
    pub(crate) task: Arc<dyn Task<T>>,
    pub(crate) completion: Option<oneshot::Sender<JobOutcome<T>>>,
    pub(crate) retries: u32,
    pub(crate) started: Option<StartMark>,
}

impl<T> std::fmt::Debug for Job<T>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("retries", &self.retries)
            .field("started_ms", &self.started.map(|s| s.wall_ms))
            .field("settled", &self.completion.is_none())
            .finish_non_exhaustive()
    }
}

impl<T> Job<T>
where
    T: Send + 'static,
{
    /// Create a fresh record and the handle observing it.
    pub fn new<K>(id: JobId, task: K) -> (Self, JobHandle<T>)
    where
        K: Task<T>,
    {
        let (tx, rx) = oneshot::channel();
        let job = Self {
            id,
            task: Arc::new(task),
            completion: Some(tx),
            retries: 0,
            started: None,
        };
        (job, JobHandle { id, rx })
    }

    /// Caller-supplied identifier.
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Retries consumed so far.
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Wall-clock ms of the first dispatch, if dispatched.
    pub fn start_time_ms(&self) -> Option<u128> {
        self.started.map(|s| s.wall_ms)
    }

    /// Integrity check run on every dequeued record.
    pub(crate) fn validate(&self) -> Result<(), QueueError> {
        if self.completion.is_none() {
            return Err(QueueError::task_invalid(self.id));
        }
        Ok(())
    }

    /// Stamp the first dispatch; later calls keep the original mark.
    pub(crate) fn mark_started(&mut self) {
        if self.started.is_none() {
            self.started = Some(StartMark {
                wall_ms: now_ms(),
                instant: Instant::now(),
            });
        }
    }

    /// Time since the first dispatch (zero if never dispatched).
    pub(crate) fn elapsed(&self) -> Duration {
        self.started
            .map(|s| s.instant.elapsed())
            .unwrap_or_default()
    }

    /// Settle the record. Returns `false` if it was already settled or the
    /// handle has been dropped.
    pub(crate) fn settle(&mut self, outcome: JobOutcome<T>) -> bool {
        self.completion
            .take()
            .is_some_and(|tx| tx.send(outcome).is_ok())
    }
}

/// Handle to a submitted job; resolves once the job settles.
///
/// Dropping the handle does not cancel the job. If the scheduler discards the
/// record without settling it, the handle resolves to `UNKNOWN_ERROR`.
#[derive(Debug)]
#[must_use = "a JobHandle does nothing unless awaited"]
pub struct JobHandle<T> {
    id: JobId,
    rx: oneshot::Receiver<JobOutcome<T>>,
}

impl<T> JobHandle<T> {
    /// Identifier supplied at submission.
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Block the current thread until the job settles.
    ///
    /// Must not be called from within an async runtime thread.
    ///
    /// # Errors
    ///
    /// Returns the job's terminal [`QueueError`].
    pub fn wait_blocking(self) -> JobOutcome<T> {
        let id = self.id;
        self.rx
            .blocking_recv()
            .unwrap_or_else(|_| Err(dropped(id)))
    }
}

impl<T> Future for JobHandle<T> {
    type Output = JobOutcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|_| Err(dropped(id))))
    }
}

fn dropped(id: JobId) -> QueueError {
    QueueError::unknown(format!("Task Id {id} was dropped before completion"))
        .with_extra(serde_json::json!({ "id": id }))
}
