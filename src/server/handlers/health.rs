use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::job::JobStatus;
use crate::metrics;
use crate::server::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub jobs_tracked: usize,
    pub uptime_seconds: u64,
}

/// Health check endpoint returning structured JSON diagnostics. Also
/// refreshes the per-status job gauges, since this is the one place
/// polled often enough to double as a metrics heartbeat.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.started_at.elapsed().as_secs();
    let jobs_tracked = state.controller.store().count();

    for status in [JobStatus::Queued, JobStatus::Processing, JobStatus::Completed, JobStatus::Failed] {
        let count = state.controller.store().count_by_status(status);
        metrics::set_jobs_by_status(status_label(status), count);
    }

    Json(HealthResponse { status: "ok", version: VERSION, jobs_tracked, uptime_seconds: uptime })
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "queued",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    }
}
