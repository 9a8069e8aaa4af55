//! In-memory queue store with retry-first ordering.

use std::collections::VecDeque;

use crate::core::{Job, JobQueue};

/// In-memory queue backed by a `VecDeque`.
///
/// Fresh jobs are appended (FIFO); retried jobs are pushed to the head, so
/// several outstanding retries are served in reverse order of their retry.
/// Under sustained retry pressure fresh jobs can wait indefinitely.
pub struct InMemoryQueue<T>
where
    T: Send + 'static,
{
    jobs: VecDeque<Job<T>>,
}

impl<T> InMemoryQueue<T>
where
    T: Send + 'static,
{
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    /// Create an empty queue with room for `capacity` jobs before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: VecDeque::with_capacity(capacity),
        }
    }

    /// Ids in dispatch order.
    pub fn ids(&self) -> Vec<crate::util::serde::JobId> {
        self.jobs.iter().map(Job::id).collect()
    }
}

impl<T> Default for InMemoryQueue<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for InMemoryQueue<T>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryQueue")
            .field("jobs", &self.jobs)
            .finish()
    }
}

impl<T> JobQueue<T> for InMemoryQueue<T>
where
    T: Send + 'static,
{
    fn push_back(&mut self, job: Job<T>) {
        self.jobs.push_back(job);
    }

    fn push_front(&mut self, job: Job<T>) {
        self.jobs.push_front(job);
    }

    fn pop_front(&mut self) -> Option<Job<T>> {
        self.jobs.pop_front()
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}
