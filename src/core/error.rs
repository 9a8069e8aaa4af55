//! Error types for scheduler operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::clock::duration_ms;
use crate::util::serde::JobId;

/// Default status code carried by [`QueueError`].
pub const DEFAULT_ERROR_CODE: u16 = 500;

/// Errors produced while constructing or wiring scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No async runtime is available to drive jobs.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Classification of a job failure.
///
/// Serialized in `SCREAMING_SNAKE_CASE` (`TASK_TIMEOUT`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A dequeued job record was missing required state.
    TaskInvalid,
    /// One attempt exceeded the configured task timeout.
    TaskTimeout,
    /// The retry budget is exhausted; terminal.
    TaskFailed,
    /// Anything else, including a job dropped before it settled.
    UnknownError,
}

impl ErrorKind {
    /// Wire name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskInvalid => "TASK_INVALID",
            Self::TaskTimeout => "TASK_TIMEOUT",
            Self::TaskFailed => "TASK_FAILED",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error delivered through a [`JobHandle`](crate::core::JobHandle).
///
/// `name` and `cause` always carry the same [`ErrorKind`]; both are kept so the
/// serialized shape matches what log consumers expect.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct QueueError {
    /// Human readable message.
    pub message: String,
    /// Failure classification.
    pub name: ErrorKind,
    /// Same as `name`.
    pub cause: ErrorKind,
    /// Status code, 500 unless overridden.
    pub code: u16,
    /// Structured context (job id, retries, elapsed time).
    pub extra: serde_json::Value,
    /// Diagnostic detail not meant for end users.
    pub dev_message: String,
}

impl QueueError {
    /// Build an error of the given kind with default code and empty context.
    pub fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            name: kind,
            cause: kind,
            code: DEFAULT_ERROR_CODE,
            extra: serde_json::Value::Object(serde_json::Map::new()),
            dev_message: String::new(),
        }
    }

    /// Override the status code.
    #[must_use]
    pub const fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Attach structured context.
    #[must_use]
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = extra;
        self
    }

    /// Attach a diagnostic message.
    #[must_use]
    pub fn with_dev_message(mut self, dev_message: impl Into<String>) -> Self {
        self.dev_message = dev_message.into();
        self
    }

    /// Failure classification.
    pub const fn kind(&self) -> ErrorKind {
        self.name
    }

    /// Retry count recorded in `extra`, if any.
    pub fn retries(&self) -> Option<u32> {
        self.extra
            .get("retries")
            .and_then(serde_json::Value::as_u64)
            .and_then(|r| u32::try_from(r).ok())
    }

    /// Job id recorded in `extra`, if any.
    pub fn job_id(&self) -> Option<JobId> {
        self.extra.get("id").and_then(serde_json::Value::as_u64)
    }

    /// A dequeued record failed its integrity check.
    pub fn task_invalid(id: JobId) -> Self {
        Self::new("Invalid task received", ErrorKind::TaskInvalid)
            .with_extra(serde_json::json!({ "id": id }))
    }

    /// One attempt outlived the timeout.
    pub fn task_timeout(id: JobId, timeout: Duration) -> Self {
        Self::new(
            format!("Task Id {id} timeout after {}ms", duration_ms(timeout)),
            ErrorKind::TaskTimeout,
        )
        .with_extra(serde_json::json!({ "id": id, "timeoutMs": duration_ms(timeout) }))
    }

    /// Terminal failure once the retry budget is spent.
    ///
    /// `reason` is the message of the last failed attempt.
    pub fn task_failed(id: JobId, reason: &str, elapsed: Duration, retries: u32) -> Self {
        let elapsed_ms = duration_ms(elapsed);
        Self::new(
            format!("Task Id {id}, {reason} failed in {elapsed_ms}ms with {retries} retries"),
            ErrorKind::TaskFailed,
        )
        .with_extra(serde_json::json!({
            "id": id,
            "retries": retries,
            "executionTime": elapsed_ms,
        }))
        .with_dev_message(reason)
    }

    /// Catch-all error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(message, ErrorKind::UnknownError)
    }
}

/// Application-facing result using anyhow; task bodies return this.
pub type AppResult<T> = Result<T, anyhow::Error>;
