//! Tests for tokio spawner utilities and read models

use std::collections::HashMap;

use prometheus_task_queue::builders::QueueBuilder;
use prometheus_task_queue::config::{QueueConfig, SchedulerConfig};
use prometheus_task_queue::core::{AppResult, QueueStatus, Spawn};
use prometheus_task_queue::runtime::{list_queues, snapshot_queues, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_try_current_outside_runtime() {
    assert!(TokioSpawner::try_current().is_err());
}

#[test]
fn test_status_serialized_camel_case() {
    let status = QueueStatus {
        queue_length: 1,
        running_tasks: 5,
    };
    let json = serde_json::to_value(status).unwrap();
    assert_eq!(json, serde_json::json!({ "queueLength": 1, "runningTasks": 5 }));
}

#[test]
fn test_list_queues_sorted() {
    let mut queues = HashMap::new();
    queues.insert("b".to_string(), QueueConfig::new().with_retry_limit(1));
    queues.insert("a".to_string(), QueueConfig::new().with_concurrency_limit(7));

    let listed = list_queues(&SchedulerConfig { queues });
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "a");
    assert_eq!(listed[0].concurrency_limit, 7);
    assert_eq!(listed[1].retry_limit, 1);
    assert!(listed[0].status.is_none());
}

#[tokio::test]
async fn test_snapshot_queues() {
    let queue = QueueBuilder::new().silent().build::<u32>().unwrap();
    queue.enqueue(1, || async { AppResult::Ok(1_u32) }).await.unwrap();

    let mut queues = HashMap::new();
    queues.insert("main".to_string(), queue);

    let snaps = snapshot_queues(&queues);
    assert_eq!(snaps.len(), 1);
    assert_eq!(snaps[0].status, Some(QueueStatus::default()));
    assert_eq!(snaps[0].stats.map(|s| s.succeeded), Some(1));
}
