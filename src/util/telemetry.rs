//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing/telemetry. Users can install their own subscriber; this
/// helper installs a default env-based subscriber if none is set.
///
/// The default [`TracingSink`](crate::core::TracingSink) forwards scheduler log
/// entries into whatever subscriber is active, so `RUST_LOG=prometheus_task_queue=trace`
/// shows every verbose scheduling step.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
