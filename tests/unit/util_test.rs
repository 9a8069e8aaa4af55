//! Tests for utility functions

use std::time::Duration;

use prometheus_task_queue::core::JobResponse;
use prometheus_task_queue::util::{duration_ms, now_ms, JobId};

#[test]
fn test_now_ms_is_after_2020() {
    assert!(now_ms() > 1_577_836_800_000);
}

#[test]
fn test_duration_ms() {
    assert_eq!(duration_ms(Duration::from_micros(2_999)), 2);
    assert_eq!(duration_ms(Duration::MAX), u64::MAX);
}

#[test]
fn test_job_response_duration_as_millis() {
    let res = JobResponse {
        id: 1,
        result: "ok".to_string(),
        execution_time: Duration::from_millis(1_250),
        retries: 2,
        start_time_ms: 1_700_000_000_000,
    };
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["executionTime"], 1_250);
    assert_eq!(json["startTimeMs"], 1_700_000_000_000_u64);
    assert_eq!(json["retries"], 2);

    let back: JobResponse<String> = serde_json::from_value(json).unwrap();
    assert_eq!(back, res);
}

#[test]
fn test_job_id() {
    let id: JobId = 12345;
    assert_eq!(id, 12345);
}

#[test]
fn test_init_tracing_is_idempotent() {
    prometheus_task_queue::util::init_tracing();
    prometheus_task_queue::util::init_tracing();
    tracing::trace!("subscriber installed");
}
