use tracing_subscriber::EnvFilter;

/// Structured JSON logging, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .try_init();
}

/// Register descriptions for the orchestrator's metrics.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "future_self_tasks_submitted",
        "Upload tasks started from the panel"
    );
    metrics::describe_counter!(
        "future_self_tasks_succeeded",
        "Upload tasks whose processed result became available"
    );
    metrics::describe_counter!(
        "future_self_tasks_failed",
        "Upload tasks aborted by an issuer, storage or polling failure"
    );
    metrics::describe_counter!(
        "future_self_tasks_canceled",
        "Upload tasks canceled by the user"
    );
    metrics::describe_histogram!(
        "future_self_task_seconds",
        "Time from submission to an available result"
    );
}
