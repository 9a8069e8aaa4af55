//! Tests for log sinks

use prometheus_task_queue::core::{build_log_entry, InMemorySink, LogLevel, LogSink, NoopSink, TracingSink};

#[test]
fn test_in_memory_sink() {
    let sink = InMemorySink::new(10);

    sink.log(build_log_entry(LogLevel::Debug, "Running Task Id: 1", Some(1)));
    assert_eq!(sink.len(), 1);

    let entries = sink.entries();
    assert_eq!(entries[0].level, LogLevel::Debug);
    assert_eq!(entries[0].message, "Running Task Id: 1");
    assert_eq!(entries[0].job_id, Some(1));
    assert!(entries[0].created_at_ms > 0);
}

#[test]
fn test_in_memory_sink_overflow() {
    let sink = InMemorySink::new(2);

    sink.log(build_log_entry(LogLevel::Debug, "one", None));
    sink.log(build_log_entry(LogLevel::Debug, "two", None));
    sink.log(build_log_entry(LogLevel::Warn, "three", None));

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "two"); // First one popped
    assert_eq!(entries[1].message, "three");
    assert_eq!(sink.entries_at(LogLevel::Warn).len(), 1);
}

#[test]
fn test_zero_capacity_sink_stays_empty() {
    let sink = InMemorySink::new(0);
    sink.log(build_log_entry(LogLevel::Error, "dropped", None));
    assert!(sink.is_empty());
}

#[test]
fn test_noop_and_tracing_sinks_accept_entries() {
    NoopSink.log(build_log_entry(LogLevel::Error, "ignored", Some(1)));
    TracingSink.log(build_log_entry(LogLevel::Verbose, "traced", Some(1)));
}

#[test]
fn test_log_entry_serialization() {
    let entry = build_log_entry(LogLevel::Verbose, "Task Id: 2 Added to Queue", Some(2));
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["level"], "verbose");
    assert_eq!(json["jobId"], 2);
    assert_eq!(json["message"], "Task Id: 2 Added to Queue");
}

#[test]
fn test_level_ordering() {
    assert!(LogLevel::Error < LogLevel::Warn);
    assert!(LogLevel::Debug < LogLevel::Verbose);
}
