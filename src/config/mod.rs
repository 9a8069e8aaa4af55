//! Configuration models for queues, limits and timeouts.

pub mod queue;

pub use queue::{QueueConfig, SchedulerConfig};
