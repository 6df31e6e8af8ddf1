use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::oracle::{Placement, Product, ViewerProfile};

/// `POST /videos/process` request body (§6).
#[derive(Clone, Debug, Deserialize)]
pub struct SubmitRequest {
    pub video_path: String,
    pub subtitle_path: String,
    pub product: Product,
    #[serde(default)]
    pub user_data: Option<ViewerProfile>,
    #[serde(default = "default_buffer_seconds")]
    pub buffer_seconds: f64,
    #[serde(default)]
    pub use_ai: bool,
}

fn default_buffer_seconds() -> f64 {
    10.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// `{error_kind, message}` captured when a stage fails.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobError {
    pub kind: String,
    pub message: String,
}

/// Output directory tree paths for one job, relative to its job
/// directory — layout per §6 Persisted state layout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobPaths {
    pub original: PathBuf,
    pub hls_original: PathBuf,
    pub edited_clip: PathBuf,
    pub hls_edited: PathBuf,
    pub merged: PathBuf,
}

/// The range of original segments an edited segment set replaced, and the
/// resulting end index after splicing (§4.2).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EditedRange {
    pub start_seg: usize,
    pub end_seg: usize,
    pub new_end_seg: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub owner_id: String,
    pub status: JobStatus,
    pub progress_pct: u8,
    pub paths: JobPaths,
    #[serde(default)]
    pub placement: Option<Placement>,
    #[serde(default)]
    pub segment_count: Option<usize>,
    #[serde(default)]
    pub edited_range: Option<EditedRange>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<JobError>,
}

impl Job {
    pub fn new(id: Uuid, owner_id: String, job_dir: PathBuf, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            status: JobStatus::Queued,
            progress_pct: 0,
            paths: JobPaths {
                original: job_dir.join("original"),
                hls_original: job_dir.join("original"),
                edited_clip: job_dir.join("edited_segment.mp4"),
                hls_edited: job_dir.join("edited_hls"),
                merged: job_dir.join("segments"),
            },
            placement: None,
            segment_count: None,
            edited_range: None,
            created_at,
            completed_at: None,
            error: None,
        }
    }

    /// The directory that currently serves as source of truth for
    /// segment reads: `merged/` once completed with edits, else
    /// `hls_original/` — used by the Playlist Server (§4.7).
    pub fn authoritative_dir(&self) -> &std::path::Path {
        if self.status == JobStatus::Completed && self.edited_range.is_some() {
            &self.paths.merged
        } else {
            &self.paths.hls_original
        }
    }
}
