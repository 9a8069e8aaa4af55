//! # Prometheus Task Queue
//!
//! A bounded-concurrency async task queue with automatic retries and per-attempt
//! timeouts.
//!
//! Callers submit jobs; the queue runs at most `concurrency_limit` of them at once,
//! retries failed or hung attempts up to `retry_limit` times, and reports queue
//! depth and in-flight count on demand.
//!
//! ## Scheduling Rules
//!
//! - **Bounded concurrency**: a job is dispatched only while fewer than
//!   `concurrency_limit` jobs are running
//! - **Retry precedence**: a failed attempt goes back to the *front* of the queue,
//!   ahead of every job that has not run yet; the most recently retried job runs first
//! - **Sticky start time**: `execution_time` is measured from the first dispatch,
//!   across every retry
//! - **Exactly-once settlement**: each handle resolves once, with a result or with a
//!   terminal `TASK_FAILED` error
//!
//! ## Known Limitation
//!
//! Timeouts abandon the *wait*, not the work. A timed-out attempt keeps running in
//! the background while the queue moves on, so tasks with side effects should be
//! idempotent.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_task_queue::builders::QueueBuilder;
//!
//! let queue = QueueBuilder::new()
//!     .concurrency_limit(10)
//!     .retry_limit(3)
//!     .task_timeout(Duration::from_secs(5))
//!     .build::<String>()?;
//!
//! let handle = queue.enqueue(1, || async { Ok("done".to_string()) });
//! println!("{:?}", queue.status());
//!
//! match handle.await {
//!     Ok(res) => println!("Task Id {} finished in {:?} with {} retries", res.id, res.execution_time, res.retries),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! For complete examples, see `tests/scheduler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and concurrency accounting.
pub mod core;
/// Configuration models for queues, limits and timeouts.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Infrastructure adapters for queue storage.
pub mod infra;
/// Runtime adapters and read-model API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
