use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use base64::Engine;
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::generation::{GenerationClient, build_prompt, upload_to_temp_hosting};
use crate::hls::playlist;
use crate::media::MediaOperator;
use crate::metrics;
use crate::oracle::{OracleClient, Placement, Product, ViewerProfile};
use crate::server::url_validation::{is_remote, validate_origin_url};
use crate::subtitle::{self, Gap};

use super::model::{EditedRange, Job, JobError, JobStatus, SubmitRequest};
use super::store::{JobStore, progress};

/// Ties C1-C5 into the §4.6 stage sequence and owns background worker
/// dispatch. One controller instance per process, shared via `AppState`.
#[derive(Clone)]
pub struct JobController {
    config: Arc<Config>,
    store: JobStore,
    media: Arc<MediaOperator>,
    oracle: OracleClient,
    generation: GenerationClient,
    http: reqwest::Client,
}

impl JobController {
    pub fn new(
        config: Arc<Config>,
        store: JobStore,
        media: Arc<MediaOperator>,
        oracle: OracleClient,
        generation: GenerationClient,
        http: reqwest::Client,
    ) -> Self {
        Self { config, store, media, oracle, generation, http }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn oracle(&self) -> &OracleClient {
        &self.oracle
    }

    /// Validate and admit a submission, spawning the background worker.
    /// No job is created on validation failure (§7 `invalid-input`).
    pub async fn submit(&self, owner_id: String, req: SubmitRequest) -> Result<Job> {
        if req.video_path.trim().is_empty() {
            return Err(PipelineError::InvalidInput("video_path must not be empty".to_string()));
        }
        if req.subtitle_path.trim().is_empty() {
            return Err(PipelineError::InvalidInput("subtitle_path must not be empty".to_string()));
        }
        if req.product.product.trim().is_empty() {
            return Err(PipelineError::InvalidInput("product.product must not be empty".to_string()));
        }

        let id = Uuid::new_v4();
        let job_dir = self.config.job_dir(&id);
        tokio::fs::create_dir_all(&job_dir).await?;

        let job = Job::new(id, owner_id, job_dir, Utc::now());
        self.store.insert(job.clone());
        info!(job_id = %id, "job submitted");

        let worker = self.clone();
        tokio::spawn(async move {
            worker.run(id, req).await;
        });

        Ok(job)
    }

    /// Resolve a `video_path`/`subtitle_path` submission field to a local
    /// file: downloads remote URLs (SSRF-validated) into `dest_dir/name`,
    /// or passes a local path through unchanged.
    async fn resolve_input(&self, path_or_url: &str, dest_dir: &Path, name: &str) -> Result<PathBuf> {
        if !is_remote(path_or_url) {
            return Ok(PathBuf::from(path_or_url));
        }

        validate_origin_url(path_or_url)?;
        tokio::fs::create_dir_all(dest_dir).await?;
        let dest = dest_dir.join(name);

        let response = self.http.get(path_or_url).send().await?;
        let bytes = response.bytes().await?;
        tokio::fs::write(&dest, &bytes).await?;
        Ok(dest)
    }

    fn fail(&self, id: &Uuid, err: &PipelineError) {
        error!(job_id = %id, kind = err.kind(), "job failed: {}", err);
        self.store.update(id, |j| {
            j.status = JobStatus::Failed;
            j.error = Some(JobError { kind: err.kind().to_string(), message: err.to_string() });
            j.completed_at = Some(Utc::now());
        });
    }

    async fn run(&self, id: Uuid, req: SubmitRequest) {
        self.store.update(&id, |j| j.status = JobStatus::Processing);

        if let Err(e) = self.run_stages(&id, &req).await {
            self.fail(&id, &e);
        }
    }

    /// Stage order is strict: segment-original → placement → extract →
    /// generate → segment-edited → splice (§5 Ordering guarantees).
    async fn run_stages(&self, id: &Uuid, req: &SubmitRequest) -> Result<()> {
        let job = self.store.get(id).ok_or(PipelineError::JobNotFound)?;
        let video_path = self.resolve_input(&req.video_path, &job.paths.original, "source.mp4").await?;
        let subtitle_path =
            self.resolve_input(&req.subtitle_path, &job.paths.original, "subtitles.srt").await?;

        // 1. Segment original -> hls_original/.
        let stage_start = Instant::now();
        let hls_original = self
            .media
            .segment_hls(&video_path, &job.paths.hls_original, self.config.segment_duration as f64)
            .await?;
        metrics::record_stage_duration("segment-original", stage_start);
        self.store.update(id, |j| {
            j.segment_count = Some(hls_original.segment_count);
            j.progress_pct = progress::POST_HLS;
        });

        // 2. Placement oracle.
        let subtitle_content = tokio::fs::read_to_string(&subtitle_path).await?;
        let cues = subtitle::parse_file(&req.subtitle_path, &subtitle_content)?;
        let gaps = subtitle::find_gaps(&cues, self.config.min_gap_s);
        let transcript_summary = subtitle::transcript_summary(&cues, 100);
        let profile = req.user_data.clone().unwrap_or_default();
        let buffer_before = req.buffer_seconds;
        let buffer_after = self.config.default_buffer_after_s;

        let stage_start = Instant::now();
        let placement = if req.use_ai {
            self.multipass_placement(
                &video_path,
                &gaps,
                &transcript_summary,
                &req.product,
                &profile,
                buffer_before,
                buffer_after,
                hls_original.duration_s,
            )
            .await?
        } else {
            self.oracle
                .analyze(
                    &gaps,
                    &transcript_summary,
                    &req.product,
                    &profile,
                    buffer_before,
                    buffer_after,
                    hls_original.duration_s,
                )
                .await?
        };

        metrics::record_stage_duration("placement", stage_start);
        self.store.update(id, |j| {
            j.placement = Some(placement.clone());
            j.progress_pct = progress::POST_PLACEMENT;
        });

        // 3. Extract buffer clip [buffer_start, buffer_end) via C3.
        let stage_start = Instant::now();
        self.media.extract(&video_path, placement.buffer_start, placement.buffer_end, &job.paths.edited_clip).await?;
        metrics::record_stage_duration("extract", stage_start);

        // 4. Generation client on the clip.
        let stage_start = Instant::now();
        let remote_url = upload_to_temp_hosting(&self.http, &job.paths.edited_clip).await?;
        let prompt = build_prompt(
            &self.config.prompt_template(),
            &req.product,
            &placement.summary_before,
            &placement.summary_after,
            &profile,
            "Video",
            "General",
            placement.buffer_end - placement.buffer_start,
        );
        let generated = self
            .generation
            .generate_video(&remote_url, &prompt, "1080p", "", true, -1)
            .await?;

        let generated_clip = job.paths.edited_clip.with_file_name("generated_segment.mp4");
        self.generation.download(&generated.output_url, &generated_clip).await?;
        metrics::record_stage_duration("generate", stage_start);

        // 5. Segment the regenerated clip -> hls_edited/.
        let stage_start = Instant::now();
        let hls_edited = self
            .media
            .segment_hls(&generated_clip, &job.paths.hls_edited, self.config.segment_duration as f64)
            .await?;
        metrics::record_stage_duration("segment-edited", stage_start);

        // 6. Splice into merged/ per §4.2.
        let stage_start = Instant::now();
        let original_text = tokio::fs::read_to_string(&hls_original.playlist_path).await?;
        let original_playlist = playlist::parse_playlist(&original_text);
        let edited_text = tokio::fs::read_to_string(&hls_edited.playlist_path).await?;
        let edited_playlist = playlist::parse_playlist(&edited_text);

        let (a, b) =
            playlist::segment_range_for(&original_playlist.segments, placement.buffer_start, placement.buffer_end);
        let merged_segments = playlist::splice(&original_playlist.segments, &edited_playlist.segments, a, b);

        self.materialize_merged(
            &job.paths.hls_original,
            &job.paths.hls_edited,
            &job.paths.merged,
            &original_playlist.segments,
            &edited_playlist.segments,
            &merged_segments,
            a,
            b,
        )
        .await?;
        metrics::record_stage_duration("splice", stage_start);
        self.store.update(id, |j| {
            j.progress_pct = progress::POST_SPLICE;
        });

        // 7. Update job with edited_range and final segment_count.
        let new_end_seg = a + edited_playlist.segments.len();
        self.store.update(id, |j| {
            j.edited_range = Some(EditedRange { start_seg: a, end_seg: b, new_end_seg });
            j.segment_count = Some(merged_segments.len());
            j.status = JobStatus::Completed;
            j.progress_pct = progress::COMPLETED;
            j.completed_at = Some(Utc::now());
        });

        info!(job_id = %id, "job completed");
        Ok(())
    }

    /// Placement-only analysis, no job created: the CLI harness's `place`
    /// subcommand (§2b). Reads local files directly — no SSRF validation,
    /// since the caller is a trusted local operator, not an HTTP client.
    pub async fn analyze_placement_only(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        product: &Product,
        profile: &ViewerProfile,
        buffer_before: f64,
        buffer_after: f64,
        use_ai: bool,
    ) -> Result<Placement> {
        let subtitle_content = tokio::fs::read_to_string(subtitle_path).await?;
        let filename = subtitle_path.to_string_lossy();
        let cues = subtitle::parse_file(&filename, &subtitle_content)?;
        let gaps = subtitle::find_gaps(&cues, self.config.min_gap_s);
        let transcript_summary = subtitle::transcript_summary(&cues, 100);

        let media_duration = self.media.probe_duration(video_path).await?;

        if use_ai {
            self.multipass_placement(
                video_path,
                &gaps,
                &transcript_summary,
                product,
                profile,
                buffer_before,
                buffer_after,
                media_duration,
            )
            .await
        } else {
            self.oracle
                .analyze(&gaps, &transcript_summary, product, profile, buffer_before, buffer_after, media_duration)
                .await
        }
    }

    /// Multi-pass placement (§4.4): candidate generation, per-candidate
    /// frame grab, vision selection, buffer derivation. Confidence is
    /// fixed at 0.9 regardless of the oracle's self-estimate.
    #[allow(clippy::too_many_arguments)]
    async fn multipass_placement(
        &self,
        video_path: &Path,
        gaps: &[Gap],
        transcript_summary: &str,
        product: &Product,
        profile: &ViewerProfile,
        buffer_before: f64,
        buffer_after: f64,
        media_duration: f64,
    ) -> Result<Placement> {
        let candidates = self
            .oracle
            .find_candidates(gaps, transcript_summary, product, profile, self.config.placement_candidates)
            .await?;

        let frame_dir = tempfile::tempdir()?;
        let mut frames = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let frame_path = frame_dir.path().join(format!("candidate{i:02}.jpg"));
            self.media.grab_frame(video_path, candidate.insertion_point, &frame_path).await?;
            let bytes = tokio::fs::read(&frame_path).await?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            frames.push((candidate.clone(), encoded));
        }

        let selection = self.oracle.select_best_placement_from_frames(&frames, product).await?;
        let chosen = &candidates[selection.selected_index as usize];

        let insertion_point = selection.timestamp.unwrap_or(chosen.insertion_point);
        let buffer_start = chosen.buffer_start.unwrap_or((insertion_point - buffer_before).max(0.0));
        let buffer_end = chosen.buffer_end.unwrap_or((insertion_point + buffer_after).min(media_duration));
        let (summary_before, summary_after) = nearest_gap_context(gaps, insertion_point);

        Ok(Placement {
            insertion_point,
            buffer_start,
            buffer_end,
            confidence: 0.9,
            reason: selection.why_selected,
            visual_description: selection.visual_description,
            rejection_notes: selection.why_others_rejected,
            summary_before,
            summary_after,
        })
    }

    /// Realize the in-memory splice as real `.ts` files in `merged/`:
    /// copy `original[..a]`, then `edited[..]`, then `original[b..]`,
    /// under the renumbered names `splice()` already assigned, plus the
    /// rewritten `playlist.m3u8`.
    #[allow(clippy::too_many_arguments)]
    async fn materialize_merged(
        &self,
        original_dir: &Path,
        edited_dir: &Path,
        merged_dir: &Path,
        original: &[playlist::Segment],
        edited: &[playlist::Segment],
        merged: &[playlist::Segment],
        a: usize,
        b: usize,
    ) -> Result<()> {
        tokio::fs::create_dir_all(merged_dir).await?;

        let mut cursor = 0usize;
        for seg in &original[..a] {
            copy_segment(original_dir, merged_dir, &seg.path, &merged[cursor].path).await?;
            cursor += 1;
        }
        for seg in edited {
            copy_segment(edited_dir, merged_dir, &seg.path, &merged[cursor].path).await?;
            cursor += 1;
        }
        for seg in &original[b..] {
            copy_segment(original_dir, merged_dir, &seg.path, &merged[cursor].path).await?;
            cursor += 1;
        }

        let merged_playlist = playlist::Playlist::new(merged.to_vec());
        let text = playlist::emit_playlist(&merged_playlist);
        tokio::fs::write(merged_dir.join("playlist.m3u8"), text).await?;
        Ok(())
    }
}

async fn copy_segment(src_dir: &Path, dst_dir: &Path, src_name: &str, dst_name: &str) -> Result<()> {
    tokio::fs::copy(src_dir.join(src_name), dst_dir.join(dst_name)).await?;
    Ok(())
}

/// Surrounding-context summaries for a chosen insertion point: the
/// `context_before`/`context_after` of whichever detected gap sits
/// closest to `t`, or empty strings if there are no gaps at all.
fn nearest_gap_context(gaps: &[Gap], t: f64) -> (String, String) {
    gaps.iter()
        .min_by(|g1, g2| {
            let d1 = (g1.start - t).abs().min((g1.end - t).abs());
            let d2 = (g2.start - t).abs().min((g2.end - t).abs());
            d1.partial_cmp(&d2).unwrap()
        })
        .map(|g| (g.context_before.clone(), g.context_after.clone()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gap(start: f64, end: f64, before: &str, after: &str) -> Gap {
        Gap {
            start,
            end,
            duration: end - start,
            context_before: before.to_string(),
            context_after: after.to_string(),
        }
    }

    #[test]
    fn nearest_gap_context_picks_closest() {
        let gaps = vec![gap(10.0, 12.0, "a", "b"), gap(50.0, 52.0, "c", "d")];
        let (before, after) = nearest_gap_context(&gaps, 11.5);
        assert_eq!(before, "a");
        assert_eq!(after, "b");
    }

    #[test]
    fn nearest_gap_context_empty_when_no_gaps() {
        let (before, after) = nearest_gap_context(&[], 5.0);
        assert_eq!(before, "");
        assert_eq!(after, "");
    }
}
