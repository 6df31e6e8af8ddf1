use std::env;
use std::path::PathBuf;

const FALLBACK_PROMPT_TEMPLATE: &str = "Seamlessly integrate {product_name} by {company} into this video scene. {summary_before} The product should appear naturally. {summary_after}";

/// Application configuration loaded from environment variables.
///
/// In DEV mode, provides sensible defaults for local iteration. In PROD
/// mode, credentials and output paths are required and `from_env` fails
/// fast at boot rather than at first request.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub is_dev: bool,

    /// Root directory under which each job's output tree is created.
    pub output_root: PathBuf,

    /// Target segment duration (seconds) used by the Segment Store.
    pub segment_duration: f32,

    /// Default buffer widths applied when a submission omits them.
    pub default_buffer_before_s: f64,
    pub default_buffer_after_s: f64,

    /// Oracle (placement reasoning + vision) provider.
    pub oracle_api_key: String,
    pub oracle_base_url: String,
    pub oracle_model: String,
    pub oracle_vision_model: String,
    pub oracle_timeout_s: u64,

    /// Generation (v2v) provider.
    pub generation_api_key: String,
    pub generation_base_url: String,
    pub generation_poll_interval_s: u64,
    pub generation_timeout_s: u64,
    pub generation_max_consecutive_errors: u32,

    /// Prompt template: read from this path if present, else a hard-coded
    /// fallback is used (§6 Environment Variables).
    pub prompt_template_path: Option<PathBuf>,

    /// Candidate count for multi-pass placement (default 5).
    pub placement_candidates: usize,

    /// Min-gap threshold in seconds for subtitle gap detection (default 1.5).
    pub min_gap_s: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        let base_url = if is_dev {
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
        } else {
            env::var("BASE_URL").map_err(|_| "BASE_URL is required in production")?
        };

        let output_root = if is_dev {
            env::var("OUTPUT_ROOT").unwrap_or_else(|_| "./video_outputs".to_string())
        } else {
            env::var("OUTPUT_ROOT").map_err(|_| "OUTPUT_ROOT is required in production")?
        }
        .into();

        let segment_duration = env::var("SEGMENT_DURATION")
            .unwrap_or_else(|_| "10.0".to_string())
            .parse()
            .unwrap_or(10.0);

        let default_buffer_before_s = env::var("DEFAULT_BUFFER_BEFORE_S")
            .unwrap_or_else(|_| "10.0".to_string())
            .parse()
            .unwrap_or(10.0);
        let default_buffer_after_s = env::var("DEFAULT_BUFFER_AFTER_S")
            .unwrap_or_else(|_| "3.0".to_string())
            .parse()
            .unwrap_or(3.0);

        let oracle_api_key = if is_dev {
            env::var("ORACLE_API_KEY").unwrap_or_default()
        } else {
            env::var("ORACLE_API_KEY").map_err(|_| "ORACLE_API_KEY is required in production")?
        };
        let oracle_base_url = env::var("ORACLE_BASE_URL")
            .unwrap_or_else(|_| "https://api.x.ai/v1".to_string());
        let oracle_model =
            env::var("ORACLE_MODEL").unwrap_or_else(|_| "grok-4-1-fast".to_string());
        let oracle_vision_model = env::var("ORACLE_VISION_MODEL")
            .unwrap_or_else(|_| "grok-2-vision-latest".to_string());
        let oracle_timeout_s = env::var("ORACLE_TIMEOUT_S")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .unwrap_or(120);

        let generation_api_key = if is_dev {
            env::var("GENERATION_API_KEY").unwrap_or_default()
        } else {
            env::var("GENERATION_API_KEY")
                .map_err(|_| "GENERATION_API_KEY is required in production")?
        };
        let generation_base_url = env::var("GENERATION_BASE_URL")
            .unwrap_or_else(|_| "https://api.wavespeed.ai/api/v3".to_string());
        let generation_poll_interval_s = env::var("GENERATION_POLL_INTERVAL_S")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let generation_timeout_s = env::var("GENERATION_TIMEOUT_S")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .unwrap_or(600);
        let generation_max_consecutive_errors = env::var("GENERATION_MAX_CONSECUTIVE_ERRORS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let prompt_template_path = env::var("PROMPT_TEMPLATE_PATH").ok().map(PathBuf::from);

        let placement_candidates = env::var("PLACEMENT_CANDIDATES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let min_gap_s = env::var("MIN_GAP_S")
            .unwrap_or_else(|_| "1.5".to_string())
            .parse()
            .unwrap_or(1.5);

        Ok(Config {
            port,
            base_url,
            is_dev,
            output_root,
            segment_duration,
            default_buffer_before_s,
            default_buffer_after_s,
            oracle_api_key,
            oracle_base_url,
            oracle_model,
            oracle_vision_model,
            oracle_timeout_s,
            generation_api_key,
            generation_base_url,
            generation_poll_interval_s,
            generation_timeout_s,
            generation_max_consecutive_errors,
            prompt_template_path,
            placement_candidates,
            min_gap_s,
        })
    }

    /// Load the prompt template from `prompt_template_path` if configured
    /// and present on disk, otherwise the hard-coded fallback.
    pub fn prompt_template(&self) -> String {
        if let Some(path) = &self.prompt_template_path {
            if let Ok(contents) = std::fs::read_to_string(path) {
                return contents;
            }
        }
        FALLBACK_PROMPT_TEMPLATE.to_string()
    }

    /// Output directory tree root for a given job id.
    pub fn job_dir(&self, job_id: &uuid::Uuid) -> PathBuf {
        self.output_root.join(job_id.to_string())
    }
}
