//! Tests for builder modules

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use prometheus_task_queue::builders::{build_queues, QueueBuilder};
use prometheus_task_queue::config::{QueueConfig, SchedulerConfig};
use prometheus_task_queue::core::{AppResult, LogSink, NoopSink, SchedulerError};
use prometheus_task_queue::infra::InMemoryQueue;
use prometheus_task_queue::runtime::TokioSpawner;

#[test]
fn test_queue_builder_defaults() {
    let builder = QueueBuilder::new();
    assert_eq!(builder.config(), &QueueConfig::default());
}

#[test]
fn test_queue_builder_overrides() {
    let builder = QueueBuilder::new()
        .concurrency_limit(10)
        .retry_limit(0)
        .task_timeout(Duration::from_secs(2));
    assert_eq!(builder.config().concurrency_limit, 10);
    assert_eq!(builder.config().retry_limit, 0);
    assert_eq!(builder.config().task_timeout_ms, 2_000);
}

#[tokio::test]
async fn test_queue_builder_build() {
    let queue = QueueBuilder::from_config(QueueConfig::new().with_concurrency_limit(2))
        .silent()
        .build::<u32>()
        .unwrap();
    assert_eq!(queue.limits().concurrency_limit, 2);
    let res = queue.enqueue(1, || async { AppResult::Ok(9_u32) }).await.unwrap();
    assert_eq!(res.result, 9);
}

#[tokio::test]
async fn test_build_queues_per_name() {
    let mut queues = HashMap::new();
    queues.insert("fast".to_string(), QueueConfig::new().with_concurrency_limit(8));
    queues.insert("slow".to_string(), QueueConfig::new().with_concurrency_limit(1));
    let cfg = SchedulerConfig { queues };

    let logger: Arc<dyn LogSink> = Arc::new(NoopSink);
    let spawner = TokioSpawner::try_current().unwrap();
    let built = build_queues::<u32, InMemoryQueue<u32>, _, _>(
        &cfg,
        |_, _| Ok(InMemoryQueue::new()),
        &spawner,
        &logger,
    )
    .unwrap();

    assert_eq!(built.len(), 2);
    assert_eq!(built["fast"].limits().concurrency_limit, 8);
    assert_eq!(built["slow"].limits().concurrency_limit, 1);

    let res = built["slow"]
        .enqueue(1, || async { AppResult::Ok(1_u32) })
        .await
        .unwrap();
    assert_eq!(res.result, 1);
    assert_eq!(built["fast"].stats().submitted, 0);
}

#[tokio::test]
async fn test_build_queues_propagates_factory_error() {
    let mut queues = HashMap::new();
    queues.insert("broken".to_string(), QueueConfig::default());
    let cfg = SchedulerConfig { queues };

    let logger: Arc<dyn LogSink> = Arc::new(NoopSink);
    let spawner = TokioSpawner::try_current().unwrap();
    let result = build_queues::<u32, InMemoryQueue<u32>, _, _>(
        &cfg,
        |name, _| Err(SchedulerError::Backend(format!("{name} unavailable"))),
        &spawner,
        &logger,
    );
    assert!(matches!(result, Err(SchedulerError::Backend(msg)) if msg == "broken unavailable"));
}

#[test]
fn test_build_queues_rejects_empty_config() {
    let cfg = SchedulerConfig {
        queues: HashMap::new(),
    };
    let rt = tokio::runtime::Runtime::new().unwrap();
    let spawner = TokioSpawner::new(rt.handle().clone());
    let logger: Arc<dyn LogSink> = Arc::new(NoopSink);
    let result = build_queues::<u32, InMemoryQueue<u32>, _, _>(
        &cfg,
        |_, _| Ok(InMemoryQueue::new()),
        &spawner,
        &logger,
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}
