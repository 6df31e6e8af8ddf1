//! `adstitch place <input.json>` — placement-only analysis, no server, no
//! generation/splice stages. Mirrors the original CLI's `main.py <input>`
//! dispatch (§2b): reads a submission-shaped JSON file, runs C1+C4, and
//! prints the resulting `Placement` as JSON on stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::config::Config;
use crate::error::Result;
use crate::generation::GenerationClient;
use crate::job::{JobController, JobStore};
use crate::media::MediaOperator;
use crate::oracle::{OracleClient, Product, ViewerProfile};

#[derive(Deserialize)]
struct PlaceInput {
    video_path: PathBuf,
    subtitle_path: PathBuf,
    product: Product,
    #[serde(default)]
    user_data: Option<ViewerProfile>,
    #[serde(default = "default_buffer_seconds")]
    buffer_seconds: f64,
    #[serde(default)]
    use_ai: bool,
}

fn default_buffer_seconds() -> f64 {
    10.0
}

/// Run placement-only analysis over `input_path` and print the resulting
/// placement as JSON. Returns `Err` on any failure — `main` maps that to
/// exit code 1 per §6.
pub async fn run_place(config: Config, input_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(input_path)?;
    let input: PlaceInput = serde_json::from_str(&raw)
        .map_err(|e| crate::error::PipelineError::InvalidInput(format!("malformed input JSON: {e}")))?;

    let http = reqwest::Client::new();
    let config = Arc::new(config);
    let media = Arc::new(MediaOperator::new().await);
    let oracle = OracleClient::new(
        config.oracle_base_url.clone(),
        config.oracle_api_key.clone(),
        config.oracle_model.clone(),
        config.oracle_vision_model.clone(),
        config.oracle_timeout_s,
    );
    let generation = GenerationClient::new(
        http.clone(),
        config.generation_base_url.clone(),
        config.generation_api_key.clone(),
        config.generation_poll_interval_s,
        config.generation_timeout_s,
        config.generation_max_consecutive_errors,
    );
    let controller = JobController::new(config.clone(), JobStore::new(), media, oracle, generation, http);

    let profile = input.user_data.unwrap_or_default();
    let buffer_after = config.default_buffer_after_s;

    let placement = controller
        .analyze_placement_only(
            &input.video_path,
            &input.subtitle_path,
            &input.product,
            &profile,
            input.buffer_seconds,
            buffer_after,
            input.use_ai,
        )
        .await?;

    let output = serde_json::to_string_pretty(&placement)
        .map_err(|e| crate::error::PipelineError::Internal(format!("failed to serialize placement: {e}")))?;
    println!("{output}");
    Ok(())
}
