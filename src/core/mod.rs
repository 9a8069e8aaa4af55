//! Core scheduling abstractions and concurrency accounting.

pub mod error;
pub mod job;
pub mod logger;
pub mod scheduler;
pub mod task;

pub use error::{AppResult, ErrorKind, QueueError, SchedulerError, DEFAULT_ERROR_CODE};
pub use job::{Job, JobHandle, JobOutcome, JobResponse};
pub use logger::{build_log_entry, InMemorySink, LogEntry, LogLevel, LogSink, NoopSink, TracingSink};
pub use scheduler::{AsyncQueue, JobQueue, QueueLimits, QueueStats, QueueStatus, Spawn};
pub use task::{BlockingTask, Task};
