//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use prometheus_task_queue::config::{QueueConfig, SchedulerConfig};

#[test]
fn test_queue_config_defaults() {
    let cfg = QueueConfig::default();
    assert_eq!(cfg.concurrency_limit, 3);
    assert_eq!(cfg.retry_limit, 3);
    assert_eq!(cfg.task_timeout(), Duration::from_secs(5));
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_queue_config_invalid_concurrency() {
    let invalid = QueueConfig::new().with_concurrency_limit(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_invalid_timeout() {
    let invalid = QueueConfig::new().with_task_timeout_ms(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_zero_retries_allowed() {
    let cfg = QueueConfig::new().with_retry_limit(0);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_queue_config_from_json_rejects_invalid() {
    let err = QueueConfig::from_json_str(r#"{"concurrency_limit": 0}"#).unwrap_err();
    assert!(err.contains("concurrency_limit"));
    assert!(QueueConfig::from_json_str("not json").is_err());
}

#[test]
fn test_scheduler_config_validation() {
    let mut queues = HashMap::new();
    queues.insert("default".to_string(), QueueConfig::default());

    let config = SchedulerConfig { queues };
    assert!(config.validate().is_ok());
}

#[test]
fn test_scheduler_config_empty_queues() {
    let config = SchedulerConfig {
        queues: HashMap::new(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_scheduler_config_names_bad_queue() {
    let mut queues = HashMap::new();
    queues.insert("shell".to_string(), QueueConfig::new().with_task_timeout_ms(0));

    let err = SchedulerConfig { queues }.validate().unwrap_err();
    assert!(err.contains("queue `shell` invalid"));
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "queues": {
            "downloads": {
                "concurrency_limit": 10,
                "retry_limit": 3,
                "task_timeout_ms": 5000
            },
            "reports": {}
        }
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.queues["downloads"].concurrency_limit, 10);
    assert_eq!(config.queues["reports"], QueueConfig::default());
}

#[test]
fn test_queue_config_from_lookup() {
    let cfg = QueueConfig::from_lookup(|key| match key {
        "TASK_QUEUE_CONCURRENCY_LIMIT" => Some(" 12 ".to_string()),
        "TASK_QUEUE_TASK_TIMEOUT_MS" => Some("750".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.concurrency_limit, 12);
    assert_eq!(cfg.retry_limit, 3);
    assert_eq!(cfg.task_timeout(), Duration::from_millis(750));
}

#[test]
fn test_queue_config_from_env_without_overrides() {
    let unset = ["TASK_QUEUE_CONCURRENCY_LIMIT", "TASK_QUEUE_RETRY_LIMIT", "TASK_QUEUE_TASK_TIMEOUT_MS"]
        .iter()
        .all(|key| std::env::var(key).is_err());
    if unset {
        assert_eq!(QueueConfig::from_env().unwrap(), QueueConfig::default());
    }
}
