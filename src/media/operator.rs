use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

use super::encoder::HardwareEncoder;
use crate::error::{PipelineError, Result};
use crate::hls::playlist::parse_playlist;

/// Result of segmenting a media file to HLS.
#[derive(Clone, Debug)]
pub struct HlsSegmentInfo {
    pub playlist_path: PathBuf,
    pub segment_count: usize,
    pub duration_s: f64,
}

/// Wraps the four media operations the pipeline needs, each an external
/// `ffmpeg`/`ffprobe` invocation. `MediaOperator` owns the hardware
/// encoder choice so it's probed once per process, not per call.
#[derive(Clone, Debug)]
pub struct MediaOperator {
    encoder: HardwareEncoder,
}

impl MediaOperator {
    pub async fn new() -> Self {
        Self {
            encoder: HardwareEncoder::probe().await,
        }
    }

    #[cfg(test)]
    pub fn with_encoder(encoder: HardwareEncoder) -> Self {
        Self { encoder }
    }

    /// Probe a media file's duration in seconds via `ffprobe`.
    pub async fn probe_duration(&self, src: &Path) -> Result<f64> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(src)
            .output()
            .await
            .map_err(|e| PipelineError::Internal(format!("ffprobe spawn failed: {e}")))?;

        if !output.status.success() {
            return Err(PipelineError::Internal(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .map_err(|e| PipelineError::Internal(format!("unparseable ffprobe duration: {e}")))
    }

    /// Extract `[t0, t1)` from `src` into `out`. Attempts a lossless
    /// stream-copy cut first; if `ffmpeg` rejects it (non-keyframe-aligned
    /// boundary, incompatible container), falls back to a deterministic
    /// re-encode (H.264/AAC/yuv420p).
    pub async fn extract(&self, src: &Path, t0: f64, t1: f64, out: &Path) -> Result<()> {
        let duration = (t1 - t0).max(0.0);

        let copy_status = Command::new("ffmpeg")
            .args(["-y", "-ss"])
            .arg(format!("{t0}"))
            .arg("-i")
            .arg(src)
            .args(["-t"])
            .arg(format!("{duration}"))
            .args(["-c", "copy"])
            .arg(out)
            .status()
            .await
            .map_err(|e| PipelineError::Internal(format!("ffmpeg spawn failed: {e}")))?;

        if copy_status.success() {
            return Ok(());
        }

        warn!("stream-copy extract failed, falling back to re-encode");

        let status = Command::new("ffmpeg")
            .args(["-y", "-ss"])
            .arg(format!("{t0}"))
            .arg("-i")
            .arg(src)
            .args(["-t"])
            .arg(format!("{duration}"))
            .args([
                "-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac",
            ])
            .arg(out)
            .status()
            .await
            .map_err(|e| PipelineError::Internal(format!("ffmpeg spawn failed: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::Internal(
                "ffmpeg extract failed in both copy and re-encode modes".to_string(),
            ))
        }
    }

    /// Segment `src` to VOD HLS in `dir` with target duration `tau`
    /// seconds, stream-copied, each segment independently decodable.
    pub async fn segment_hls(&self, src: &Path, dir: &Path, tau: f64) -> Result<HlsSegmentInfo> {
        tokio::fs::create_dir_all(dir).await?;
        let playlist_path = dir.join("playlist.m3u8");
        let segment_pattern = dir.join("segment%03d.ts");

        let status = Command::new("ffmpeg")
            .args(["-y", "-i"])
            .arg(src)
            .args(["-c", "copy", "-f", "hls"])
            .args(["-hls_time", &tau.to_string()])
            .args(["-hls_playlist_type", "vod"])
            .arg("-hls_segment_filename")
            .arg(&segment_pattern)
            .args(["-hls_flags", "independent_segments"])
            .arg(&playlist_path)
            .status()
            .await
            .map_err(|e| PipelineError::Internal(format!("ffmpeg spawn failed: {e}")))?;

        if !status.success() {
            return Err(PipelineError::Internal(
                "ffmpeg hls segmentation failed".to_string(),
            ));
        }

        let text = tokio::fs::read_to_string(&playlist_path).await?;
        let playlist = parse_playlist(&text);
        let duration_s: f64 = playlist.segments.iter().map(|s| s.duration_s).sum();

        info!(
            "segmented {} into {} segments ({:.1}s)",
            src.display(),
            playlist.segments.len(),
            duration_s
        );

        Ok(HlsSegmentInfo {
            playlist_path,
            segment_count: playlist.segments.len(),
            duration_s,
        })
    }

    /// Join `a`, `b`, `c` back to back into `out`. Normalizes `b` (the
    /// regenerated clip) to 1920x1080 @ 24000/1001 fps and 48 kHz audio
    /// before the concat filter graph, since it's the one segment whose
    /// provenance (an external AI provider) makes format drift likely.
    /// Re-encodes with the probed hardware H.264 encoder, `movflags
    /// +faststart`.
    pub async fn concat(&self, a: &Path, b: &Path, c: &Path, out: &Path) -> Result<()> {
        for path in [a, b, c] {
            if !path.exists() {
                return Err(PipelineError::IncompatibleStreams(format!(
                    "missing concat input: {}",
                    path.display()
                )));
            }
        }

        let filter_complex = "[0:v]setpts=PTS-STARTPTS[v0];[0:a]asetpts=PTS-STARTPTS[a0];\
             [1:v]scale=1920:1080,setsar=1,fps=24000/1001,setpts=PTS-STARTPTS[v1];\
             [1:a]aresample=48000,asetpts=PTS-STARTPTS[a1];\
             [2:v]setpts=PTS-STARTPTS[v2];[2:a]asetpts=PTS-STARTPTS[a2];\
             [v0][a0][v1][a1][v2][a2]concat=n=3:v=1:a=1[outv][outa]";

        let status = Command::new("ffmpeg")
            .args(["-y", "-i"])
            .arg(a)
            .arg("-i")
            .arg(b)
            .arg("-i")
            .arg(c)
            .args(["-filter_complex", filter_complex])
            .args(["-map", "[outv]", "-map", "[outa]"])
            .args(["-c:v", &self.encoder.0])
            .args(["-c:a", "aac", "-ar", "48000"])
            .args(["-movflags", "+faststart"])
            .arg(out)
            .status()
            .await
            .map_err(|e| PipelineError::Internal(format!("ffmpeg spawn failed: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::IncompatibleStreams(
                "ffmpeg concat failed after normalization".to_string(),
            ))
        }
    }

    /// Grab a single JPEG frame at `t` seconds, clamped to
    /// `media_duration - 0.1` so the request never lands past EOF.
    pub async fn grab_frame(&self, src: &Path, t: f64, out: &Path) -> Result<()> {
        let duration = self.probe_duration(src).await?;
        let clamped = t.min((duration - 0.1).max(0.0));

        let status = Command::new("ffmpeg")
            .args(["-y", "-ss"])
            .arg(format!("{clamped}"))
            .arg("-i")
            .arg(src)
            .args(["-frames:v", "1", "-q:v", "2"])
            .arg(out)
            .status()
            .await
            .map_err(|e| PipelineError::Internal(format!("ffmpeg spawn failed: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::Internal("ffmpeg grab_frame failed".to_string()))
        }
    }
}
