//! Builders to construct task queues from configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{QueueConfig, SchedulerConfig};
use crate::core::{AsyncQueue, JobQueue, LogSink, NoopSink, SchedulerError, Spawn, TracingSink};
use crate::infra::queue::InMemoryQueue;
use crate::runtime::TokioSpawner;
use crate::util::clock::duration_ms;

/// Fluent builder for a single [`AsyncQueue`].
///
/// ```rust,ignore
/// let queue = QueueBuilder::new()
///     .concurrency_limit(10)
///     .retry_limit(3)
///     .task_timeout(Duration::from_secs(5))
///     .silent()
///     .build::<String>()?;
/// ```
#[derive(Clone)]
pub struct QueueBuilder {
    config: QueueConfig,
    logger: Arc<dyn LogSink>,
}

impl std::fmt::Debug for QueueBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for QueueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueBuilder {
    /// Builder with default limits, logging through `tracing`.
    pub fn new() -> Self {
        Self::from_config(QueueConfig::default())
    }

    /// Builder seeded from an existing configuration.
    pub fn from_config(config: QueueConfig) -> Self {
        Self {
            config,
            logger: Arc::new(TracingSink),
        }
    }

    /// Maximum jobs executing at once.
    #[must_use]
    pub const fn concurrency_limit(mut self, limit: usize) -> Self {
        self.config.concurrency_limit = limit;
        self
    }

    /// Maximum re-attempts per job.
    #[must_use]
    pub const fn retry_limit(mut self, limit: u32) -> Self {
        self.config.retry_limit = limit;
        self
    }

    /// Per-attempt timeout, truncated to whole milliseconds.
    #[must_use]
    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.config.task_timeout_ms = duration_ms(timeout);
        self
    }

    /// Route scheduler log entries to `sink`.
    #[must_use]
    pub fn logger(mut self, sink: impl LogSink + 'static) -> Self {
        self.logger = Arc::new(sink);
        self
    }

    /// Route scheduler log entries to a shared sink.
    #[must_use]
    pub fn shared_logger(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.logger = sink;
        self
    }

    /// Discard all scheduler log entries.
    #[must_use]
    pub fn silent(self) -> Self {
        self.logger(NoopSink)
    }

    /// Configuration accumulated so far.
    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Build an in-memory queue on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for invalid limits, `Runtime` outside a tokio runtime.
    pub fn build<T>(self) -> Result<AsyncQueue<T>, SchedulerError>
    where
        T: Send + 'static,
    {
        let spawner = TokioSpawner::try_current()?;
        self.build_with(InMemoryQueue::new(), spawner)
    }

    /// Build with an explicit queue store and spawner.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for invalid limits.
    pub fn build_with<T, Q, S>(
        self,
        queue: Q,
        spawner: S,
    ) -> Result<AsyncQueue<T, Q, S>, SchedulerError>
    where
        T: Send + 'static,
        Q: JobQueue<T>,
        S: Spawn + Send + Sync + 'static,
    {
        AsyncQueue::with_parts(&self.config, queue, spawner, self.logger)
    }
}

/// Build one independent queue per configured name.
///
/// All queues share `spawner` and `logger`; none share queue state.
///
/// # Errors
///
/// `InvalidConfig` if the scheduler configuration is invalid; any error from
/// `queue_factory` is returned as-is.
pub fn build_queues<T, Q, S, FQ>(
    cfg: &SchedulerConfig,
    mut queue_factory: FQ,
    spawner: &S,
    logger: &Arc<dyn LogSink>,
) -> Result<HashMap<String, AsyncQueue<T, Q, S>>, SchedulerError>
where
    T: Send + 'static,
    Q: JobQueue<T>,
    S: Spawn + Clone + Send + Sync + 'static,
    FQ: FnMut(&str, &QueueConfig) -> Result<Q, SchedulerError>,
{
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let mut queues = HashMap::with_capacity(cfg.queues.len());
    for (name, queue_cfg) in &cfg.queues {
        let store = queue_factory(name, queue_cfg)?;
        let queue = AsyncQueue::with_parts(queue_cfg, store, spawner.clone(), Arc::clone(logger))?;
        queues.insert(name.clone(), queue);
    }

    Ok(queues)
}
