//! Scheduling engine: bounded concurrency, retries and per-attempt timeouts.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::config::QueueConfig;
use crate::core::{
    build_log_entry, Job, JobHandle, JobResponse, LogLevel, LogSink, QueueError, SchedulerError,
    AppResult, BlockingTask, Task, TracingSink,
};
use crate::infra::queue::InMemoryQueue;
use crate::runtime::TokioSpawner;
use crate::util::clock::duration_ms;
use crate::util::serde::JobId;

/// Abstraction for queue backends.
///
/// Fresh jobs go to the back; retried jobs go to the front, so outstanding
/// retries are served most-recent-first ahead of every untried job.
pub trait JobQueue<T>: Send + 'static
where
    T: Send + 'static,
{
    /// Append a fresh job.
    fn push_back(&mut self, job: Job<T>);
    /// Re-insert a retried job ahead of everything else.
    fn push_front(&mut self, job: Job<T>);
    /// Remove the head job.
    fn pop_front(&mut self) -> Option<Job<T>>;
    /// Current depth.
    fn len(&self) -> usize;
    /// True when no job is pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Limits enforced by one scheduler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueLimits {
    /// Maximum jobs executing at once.
    pub concurrency_limit: usize,
    /// Maximum re-attempts per job.
    pub retry_limit: u32,
    /// Maximum duration of a single attempt.
    pub task_timeout: Duration,
}

impl From<&QueueConfig> for QueueLimits {
    fn from(cfg: &QueueConfig) -> Self {
        Self {
            concurrency_limit: cfg.concurrency_limit,
            retry_limit: cfg.retry_limit,
            task_timeout: cfg.task_timeout(),
        }
    }
}

/// Point-in-time view of the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    /// Jobs waiting for a slot.
    pub queue_length: usize,
    /// Jobs currently executing.
    pub running_tasks: usize,
}

/// Lifetime counters of a scheduler instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    /// Jobs accepted by `enqueue`.
    pub submitted: u64,
    /// Jobs settled with a result.
    pub succeeded: u64,
    /// Jobs settled with `TASK_FAILED`.
    pub failed: u64,
    /// Attempts re-queued after a failure or timeout.
    pub retried: u64,
    /// Attempts that hit the task timeout.
    pub timed_out: u64,
    /// Records discarded by the integrity check.
    pub invalid: u64,
}

#[derive(Debug, Default)]
struct QueueCounters {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    timed_out: AtomicU64,
    invalid: AtomicU64,
}

impl QueueCounters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
        }
    }
}

/// Queue store and in-flight count, always mutated together.
struct EngineState<Q> {
    queue: Q,
    running: usize,
}

/// Why one attempt did not produce a value.
enum AttemptFailure {
    Timeout(QueueError),
    Failed(String),
}

impl AttemptFailure {
    fn message(&self) -> &str {
        match self {
            Self::Timeout(err) => &err.message,
            Self::Failed(msg) => msg,
        }
    }
}

struct Shared<T, Q, S> {
    limits: QueueLimits,
    state: Mutex<EngineState<Q>>,
    counters: QueueCounters,
    logger: Arc<dyn LogSink>,
    spawner: S,
    _result: PhantomData<fn() -> T>,
}

/// Bounded-concurrency job scheduler.
///
/// At most `concurrency_limit` jobs run at once. A failed or timed-out attempt
/// is re-queued at the front while the job has retry budget; otherwise the
/// submitter receives a terminal `TASK_FAILED` error.
///
/// The timeout abandons the *wait*, not the work: a timed-out attempt keeps
/// running on the runtime after the scheduler has moved on.
///
/// Cloning is cheap; clones share the same queue. Independent instances never
/// share state.
///
/// ```rust,ignore
/// use prometheus_task_queue::config::QueueConfig;
/// use prometheus_task_queue::core::AsyncQueue;
///
/// let queue = AsyncQueue::<u32>::new(QueueConfig::default().with_concurrency_limit(10))?;
/// let handle = queue.enqueue(1, || async { Ok(7) });
/// let response = handle.await?;
/// println!("{} finished in {:?} after {} retries", response.id, response.execution_time, response.retries);
/// ```
pub struct AsyncQueue<T, Q = InMemoryQueue<T>, S = TokioSpawner>
where
    T: Send + 'static,
{
    shared: Arc<Shared<T, Q, S>>,
}

impl<T, Q, S> Clone for AsyncQueue<T, Q, S>
where
    T: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, Q, S> std::fmt::Debug for AsyncQueue<T, Q, S>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncQueue").finish_non_exhaustive()
    }
}

impl<T> AsyncQueue<T>
where
    T: Send + 'static,
{
    /// Create a queue on the current tokio runtime, logging through `tracing`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration fails validation, `Runtime` when
    /// called outside a tokio runtime.
    pub fn new(config: QueueConfig) -> Result<Self, SchedulerError> {
        let spawner = TokioSpawner::try_current()?;
        Self::with_parts(&config, InMemoryQueue::new(), spawner, Arc::new(TracingSink))
    }
}

impl<T, Q, S> AsyncQueue<T, Q, S>
where
    T: Send + 'static,
    Q: JobQueue<T>,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a queue from explicit components.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration fails validation.
    pub fn with_parts(
        config: &QueueConfig,
        queue: Q,
        spawner: S,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        let limits = QueueLimits::from(config);
        tracing::debug!(
            concurrency_limit = limits.concurrency_limit,
            retry_limit = limits.retry_limit,
            task_timeout_ms = duration_ms(limits.task_timeout),
            "task queue initialized"
        );
        Ok(Self {
            shared: Arc::new(Shared {
                limits,
                state: Mutex::new(EngineState { queue, running: 0 }),
                counters: QueueCounters::default(),
                logger,
                spawner,
                _result: PhantomData,
            }),
        })
    }

    /// Submit a job. Never blocks and never fails synchronously; every failure
    /// arrives through the returned handle.
    pub fn enqueue<K>(&self, id: JobId, task: K) -> JobHandle<T>
    where
        K: Task<T>,
    {
        self.shared
            .log(LogLevel::Debug, format!("Adding Task Id: {id} to Queue"), id);
        let (job, handle) = Job::new(id, task);
        self.shared.state.lock().queue.push_back(job);
        self.shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
        self.shared
            .log(LogLevel::Verbose, format!("Task Id: {id} Added to Queue"), id);
        Shared::drain(&self.shared);
        handle
    }

    /// Submit a synchronous job. It runs on the blocking pool, so the attempt
    /// timeout applies even when the closure blocks.
    pub fn enqueue_blocking<F>(&self, id: JobId, f: F) -> JobHandle<T>
    where
        F: Fn() -> AppResult<T> + Send + Sync + 'static,
    {
        self.enqueue(id, BlockingTask::new(f))
    }

    /// Current queue length and in-flight count.
    pub fn status(&self) -> QueueStatus {
        let state = self.shared.state.lock();
        QueueStatus {
            queue_length: state.queue.len(),
            running_tasks: state.running,
        }
    }

    /// Lifetime counters.
    pub fn stats(&self) -> QueueStats {
        self.shared.counters.snapshot()
    }

    /// Limits this instance enforces.
    pub fn limits(&self) -> QueueLimits {
        self.shared.limits
    }
}

impl<T, Q, S> Shared<T, Q, S>
where
    T: Send + 'static,
    Q: JobQueue<T>,
    S: Spawn + Send + Sync + 'static,
{
    fn log(&self, level: LogLevel, message: String, id: JobId) {
        self.logger.log(build_log_entry(level, message, Some(id)));
    }

    /// Dispatch queued jobs while there is headroom.
    fn drain(this: &Arc<Self>) {
        while let Some(job) = this.next_dispatch() {
            this.log(LogLevel::Debug, format!("Running Task Id: {}", job.id), job.id);
            this.spawner.spawn(Self::run_attempt(Arc::clone(this), job));
        }
    }

    /// Pop, validate and account for the next job in one critical section.
    ///
    /// Invalid records are reported and dropped after the lock is released.
    fn next_dispatch(&self) -> Option<Job<T>> {
        let mut discarded = Vec::new();
        let next = {
            let mut state = self.state.lock();
            let mut next = None;
            while state.running < self.limits.concurrency_limit {
                let Some(mut job) = state.queue.pop_front() else {
                    break;
                };
                if let Err(err) = job.validate() {
                    discarded.push((job, err));
                    continue;
                }
                state.running += 1;
                job.mark_started();
                next = Some(job);
                break;
            }
            next
        };

        for (job, err) in discarded {
            self.counters.invalid.fetch_add(1, Ordering::Relaxed);
            tracing::error!(job_id = job.id, kind = %err.kind(), "discarding invalid job record");
            self.log(LogLevel::Error, err.message, job.id);
        }
        next
    }

    /// Run one attempt, settle or re-queue the job, then keep draining.
    fn run_attempt(
        this: Arc<Self>,
        job: Job<T>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        Box::pin(async move {
            let id = job.id;
            let timeout = this.limits.task_timeout;
            let (tx, rx) = oneshot::channel();
            let task = Arc::clone(&job.task);

            // The work runs detached so a timeout only abandons the wait.
            this.spawner.spawn(async move {
                let _ = tx.send(task.run().await);
            });

            let outcome = match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(Ok(value))) => Ok(value),
                Ok(Ok(Err(err))) => Err(AttemptFailure::Failed(format!("{err:#}"))),
                Ok(Err(_)) => Err(AttemptFailure::Failed(
                    "task panicked before producing a result".to_string(),
                )),
                Err(_) => Err(AttemptFailure::Timeout(QueueError::task_timeout(id, timeout))),
            };
            if !matches!(outcome, Err(AttemptFailure::Timeout(_))) {
                this.log(
                    LogLevel::Verbose,
                    format!("Task Id: {id} Timer cancellation successful"),
                    id,
                );
            }

            this.resolve(job, outcome);
            Self::drain(&this);
        })
    }

    fn resolve(&self, mut job: Job<T>, outcome: Result<T, AttemptFailure>) {
        let id = job.id;
        match outcome {
            Ok(result) => {
                self.state.lock().running -= 1;
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                self.log(LogLevel::Debug, format!("Task Id: {id} Completed with Success"), id);
                let response = JobResponse {
                    id,
                    result,
                    execution_time: job.elapsed(),
                    retries: job.retries,
                    start_time_ms: job.start_time_ms().unwrap_or_default(),
                };
                self.deliver(&mut job, Ok(response));
            }
            Err(failure) => {
                if let AttemptFailure::Timeout(err) = &failure {
                    self.counters.timed_out.fetch_add(1, Ordering::Relaxed);
                    self.log(LogLevel::Warn, err.message.clone(), id);
                }
                let mut state = self.state.lock();
                state.running -= 1;
                if job.retries < self.limits.retry_limit {
                    job.retries += 1;
                    state.queue.push_front(job);
                    drop(state);
                    self.counters.retried.fetch_add(1, Ordering::Relaxed);
                    self.log(LogLevel::Debug, format!("Retrying Task Id: {id}"), id);
                } else {
                    drop(state);
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    self.log(LogLevel::Debug, format!("Task Id: {id} Failed"), id);
                    let err = QueueError::task_failed(
                        id,
                        failure.message(),
                        job.elapsed(),
                        job.retries,
                    );
                    self.deliver(&mut job, Err(err));
                }
            }
        }
    }

    fn deliver(&self, job: &mut Job<T>, outcome: crate::core::JobOutcome<T>) {
        if !job.settle(outcome) {
            self.log(
                LogLevel::Debug,
                format!("Task Id: {} outcome discarded, handle dropped", job.id),
                job.id,
            );
        }
    }
}
