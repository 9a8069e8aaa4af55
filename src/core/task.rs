//! Task abstraction: the deferred unit of work a job runs.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::AppResult;

/// A re-invocable, zero-argument unit of async work producing `T`.
///
/// The scheduler calls [`Task::run`] once per attempt, so implementations must
/// be safe to run again after a failure or timeout. A timed-out attempt is not
/// cancelled: the scheduler stops waiting for it and the work may keep running
/// in the background.
///
/// Any `Fn() -> impl Future<Output = AppResult<T>>` closure is a `Task`. Plain
/// synchronous closures go through [`BlockingTask`]:
///
/// ```rust,ignore
/// let handle = queue.enqueue(7, || async { Ok::<_, anyhow::Error>(42) });
/// ```
///
/// Stateful work can implement the trait directly:
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_task_queue::core::{AppResult, Task};
///
/// struct Fetch { url: String }
///
/// #[async_trait]
/// impl Task<String> for Fetch {
///     async fn run(&self) -> AppResult<String> {
///         Ok(format!("fetched {}", self.url))
///     }
/// }
/// ```
#[async_trait]
pub trait Task<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    /// Execute one attempt.
    ///
    /// # Errors
    ///
    /// Any error counts as a failed attempt and is retried while the job has
    /// retry budget left.
    async fn run(&self) -> AppResult<T>;
}

#[async_trait]
impl<F, Fut, T> Task<T> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    async fn run(&self) -> AppResult<T> {
        (self)().await
    }
}

/// Adapter running a synchronous closure on tokio's blocking pool.
///
/// The closure never occupies a runtime worker, so the attempt timeout still
/// fires when it blocks. A panic inside the closure fails the attempt.
///
/// ```rust,ignore
/// let handle = queue.enqueue(8, BlockingTask::new(|| Ok::<_, anyhow::Error>(42)));
/// ```
pub struct BlockingTask<F> {
    f: Arc<F>,
}

impl<F> BlockingTask<F> {
    /// Wrap a synchronous closure.
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

impl<F> std::fmt::Debug for BlockingTask<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingTask").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, T> Task<T> for BlockingTask<F>
where
    F: Fn() -> AppResult<T> + Send + Sync + 'static,
    T: Send + 'static,
{
    async fn run(&self) -> AppResult<T> {
        let f = Arc::clone(&self.f);
        tokio::task::spawn_blocking(move || (f)())
            .await
            .map_err(|e| anyhow::anyhow!("blocking task did not complete: {e}"))?
    }
}
