use metrics::{counter, gauge, histogram};
use std::time::Instant;

// ── Metric names ────────────────────────────────────────────────────────

/// Total HTTP requests by endpoint and status
pub const REQUESTS_TOTAL: &str = "adstitch_requests_total";
/// Request duration in seconds
pub const REQUEST_DURATION: &str = "adstitch_request_duration_seconds";
/// Jobs currently tracked, by status
pub const JOBS_BY_STATUS: &str = "adstitch_jobs_by_status";
/// Pipeline stage duration in seconds
pub const STAGE_DURATION: &str = "adstitch_stage_duration_seconds";
/// Oracle calls by task and outcome (ok, parse-error, unreachable)
pub const ORACLE_CALLS: &str = "adstitch_oracle_calls_total";
/// Generation provider calls by outcome (ok, timeout, unreachable)
pub const GENERATION_CALLS: &str = "adstitch_generation_calls_total";
/// Ephemeral-host upload attempts by host and outcome
pub const UPLOAD_ATTEMPTS: &str = "adstitch_upload_attempts_total";
/// Analytics events accepted, by kind
pub const ANALYTICS_EVENTS: &str = "adstitch_analytics_events_total";

// ── Recording helpers ───────────────────────────────────────────────────

/// Record an incoming request
pub fn record_request(endpoint: &str, status: u16) {
    counter!(REQUESTS_TOTAL, "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record request duration
pub fn record_duration(endpoint: &str, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    histogram!(REQUEST_DURATION, "endpoint" => endpoint.to_string()).record(duration);
}

/// Update the gauge for one job status bucket (queued/processing/completed/failed).
pub fn set_jobs_by_status(status: &str, count: usize) {
    gauge!(JOBS_BY_STATUS, "status" => status.to_string()).set(count as f64);
}

/// Record a pipeline stage's wall-clock duration.
pub fn record_stage_duration(stage: &str, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    histogram!(STAGE_DURATION, "stage" => stage.to_string()).record(duration);
}

/// Record an oracle call outcome (`analyze`, `candidates`, `vision-select`, `profile-infer`).
pub fn record_oracle_call(task: &str, outcome: &str) {
    counter!(ORACLE_CALLS, "task" => task.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a generation provider call outcome.
pub fn record_generation_call(outcome: &str) {
    counter!(GENERATION_CALLS, "outcome" => outcome.to_string()).increment(1);
}

/// Record an ephemeral upload attempt against one host.
pub fn record_upload_attempt(host: &str, outcome: &str) {
    counter!(UPLOAD_ATTEMPTS, "host" => host.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Record an accepted analytics event.
pub fn record_analytics_event(kind: &str) {
    counter!(ANALYTICS_EVENTS, "kind" => kind.to_string()).increment(1);
}
