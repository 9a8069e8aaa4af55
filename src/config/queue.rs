//! Queue and scheduler configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`QueueConfig::concurrency_limit`].
pub const ENV_CONCURRENCY_LIMIT: &str = "TASK_QUEUE_CONCURRENCY_LIMIT";
/// Environment variable overriding [`QueueConfig::retry_limit`].
pub const ENV_RETRY_LIMIT: &str = "TASK_QUEUE_RETRY_LIMIT";
/// Environment variable overriding [`QueueConfig::task_timeout_ms`].
pub const ENV_TASK_TIMEOUT_MS: &str = "TASK_QUEUE_TASK_TIMEOUT_MS";

const fn default_concurrency_limit() -> usize {
    3
}

const fn default_retry_limit() -> u32 {
    3
}

const fn default_task_timeout_ms() -> u64 {
    5_000
}

/// Limits for a single queue. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum jobs executing at once. Must be positive.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    /// Maximum re-attempts per job after a failure or timeout.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Per-attempt timeout in milliseconds. Must be positive.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            retry_limit: default_retry_limit(),
            task_timeout_ms: default_task_timeout_ms(),
        }
    }
}

impl QueueConfig {
    /// Default configuration (3 concurrent, 3 retries, 5s timeout).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit.
    #[must_use]
    pub const fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Set the retry limit.
    #[must_use]
    pub const fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Set the per-attempt timeout in milliseconds.
    #[must_use]
    pub const fn with_task_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.task_timeout_ms = timeout_ms;
        self
    }

    /// Per-attempt timeout as a `Duration`.
    pub const fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency_limit == 0 {
            return Err("concurrency_limit must be greater than 0".into());
        }
        if self.task_timeout_ms == 0 {
            return Err("task_timeout_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load overrides from the process environment (and a `.env` file if present)
    /// on top of the defaults.
    ///
    /// A missing `.env` file is fine; a malformed one is an error.
    pub fn from_env() -> Result<Self, String> {
        dotenv_loaded(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, using the `TASK_QUEUE_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_CONCURRENCY_LIMIT) {
            cfg.concurrency_limit = parse_var(ENV_CONCURRENCY_LIMIT, &v)?;
        }
        if let Some(v) = lookup(ENV_RETRY_LIMIT) {
            cfg.retry_limit = parse_var(ENV_RETRY_LIMIT, &v)?;
        }
        if let Some(v) = lookup(ENV_TASK_TIMEOUT_MS) {
            cfg.task_timeout_ms = parse_var(ENV_TASK_TIMEOUT_MS, &v)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn dotenv_loaded<P>(result: Result<P, dotenvy::Error>) -> Result<(), String> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("failed to load .env: {e}")),
    }
}

fn parse_var<V>(key: &str, raw: &str) -> Result<V, String>
where
    V: std::str::FromStr,
    V::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("{key}={raw:?} is invalid: {e}"))
}

/// Root scheduler configuration: independent named queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Map of queue name to configuration.
    pub queues: HashMap<String, QueueConfig>,
}

impl SchedulerConfig {
    /// Validate all queues and ensure at least one queue exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.queues.is_empty() {
            return Err("at least one queue must be defined".into());
        }
        for (name, queue) in &self.queues {
            queue
                .validate()
                .map_err(|e| format!("queue `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
