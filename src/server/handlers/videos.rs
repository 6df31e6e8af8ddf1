use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, body::Body};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{PipelineError, Result};
use crate::hls::playlist::{self, Playlist};
use crate::job::SubmitRequest;
use crate::metrics;
use crate::server::state::AppState;

#[derive(Serialize)]
pub struct ProcessResponse {
    job_id: Uuid,
    status: crate::job::JobStatus,
    playlist_url: String,
}

fn playlist_url(base_url: &str, job_id: Uuid) -> String {
    format!("{base_url}/api/v1/videos/playlist/{job_id}.m3u8")
}

fn segment_url(base_url: &str, job_id: Uuid, name: &str) -> String {
    format!("{base_url}/api/v1/videos/segments/{job_id}/{name}")
}

/// `POST /api/v1/videos/process` (§6).
pub async fn process_video(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SubmitRequest>,
) -> Result<Response> {
    let start = Instant::now();
    let job = state.controller.submit(user.id, req).await?;
    let url = playlist_url(&state.config.base_url, job.id);

    metrics::record_request("videos_process", 202);
    metrics::record_duration("videos_process", start);

    Ok((
        StatusCode::ACCEPTED,
        Json(ProcessResponse { job_id: job.id, status: job.status, playlist_url: url }),
    )
        .into_response())
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: crate::job::JobStatus,
    progress: u8,
    playlist_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// `GET /api/v1/videos/status/{job_id}` (§6).
pub async fn video_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Response> {
    let start = Instant::now();
    let job = state.controller.store().get_owned(&job_id, &user.id)?;
    let url = playlist_url(&state.config.base_url, job.id);

    metrics::record_request("videos_status", 200);
    metrics::record_duration("videos_status", start);

    Ok(Json(StatusResponse {
        status: job.status,
        progress: job.progress_pct,
        playlist_url: url,
        error: job.error.map(|e| e.kind),
        completed_at: job.completed_at,
    })
    .into_response())
}

/// `GET /api/v1/videos/playlist/{job_id}.m3u8` (§4.7/§6). Rewrites segment
/// URIs to route through `video_segment` rather than serving raw filenames
/// — the client never reads the output directory directly. Never serves a
/// playlist for a failed job: no partial playback.
pub async fn video_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id_m3u8): Path<String>,
) -> Result<Response> {
    let start = Instant::now();
    let job_id = job_id_m3u8
        .strip_suffix(".m3u8")
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(PipelineError::JobNotFound)?;
    let job = state.controller.store().get_owned(&job_id, &user.id)?;

    if job.status == crate::job::JobStatus::Failed {
        metrics::record_request("videos_playlist", 404);
        metrics::record_duration("videos_playlist", start);
        return Err(PipelineError::JobNotFound);
    }

    let dir = job.authoritative_dir();
    let text = tokio::fs::read_to_string(dir.join("playlist.m3u8"))
        .await
        .map_err(|_| PipelineError::JobNotFound)?;
    let parsed = playlist::parse_playlist(&text);

    let segments = parsed
        .segments
        .into_iter()
        .map(|mut seg| {
            seg.path = segment_url(&state.config.base_url, job_id, &seg.path);
            seg
        })
        .collect();
    let rewritten = Playlist {
        segments,
        target_duration: parsed.target_duration,
        media_sequence: parsed.media_sequence,
    };
    let out = playlist::emit_playlist(&rewritten);

    metrics::record_request("videos_playlist", 200);
    metrics::record_duration("videos_playlist", start);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/vnd.apple.mpegurl"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        out,
    )
        .into_response())
}

/// `GET /api/v1/videos/segments/{job_id}/{name}` (§4.7/§6).
pub async fn video_segment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((job_id, name)): Path<(Uuid, String)>,
) -> Result<Response> {
    let start = Instant::now();
    let job = state.controller.store().get_owned(&job_id, &user.id)?;
    let dir = job.authoritative_dir();
    let path = dir.join(&name);

    info!(job_id = %job_id, segment = %name, "serving segment");

    let bytes = tokio::fs::read(&path).await.map_err(|_| PipelineError::SegmentNotFound)?;

    metrics::record_request("videos_segment", 200);
    metrics::record_duration("videos_segment", start);

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "video/mp2t"), (header::CACHE_CONTROL, "public, max-age=3600")],
        Body::from(bytes),
    )
        .into_response())
}
