use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::metrics;

/// Outcome of a completed generation task.
#[derive(Clone, Debug)]
pub struct GenerationResult {
    pub output_url: String,
    pub elapsed_s: f64,
    pub request_id: String,
}

/// v2v generation provider client: submit-and-poll, with the provider's
/// own duration clamp and a doubled-interval back-off on transient poll
/// errors (§4.5).
#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    timeout: Duration,
    max_consecutive_errors: u32,
}

#[derive(Deserialize)]
struct SubmitEnvelope {
    data: SubmitData,
}

#[derive(Deserialize)]
struct SubmitData {
    id: String,
}

#[derive(Deserialize)]
struct PollEnvelope {
    data: PollData,
}

#[derive(Deserialize)]
struct PollData {
    status: String,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GenerationClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: String,
        poll_interval_s: u64,
        timeout_s: u64,
        max_consecutive_errors: u32,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            poll_interval: Duration::from_secs(poll_interval_s),
            timeout: Duration::from_secs(timeout_s),
            max_consecutive_errors,
        }
    }

    /// Submit a v2v generation task and poll until completion.
    ///
    /// The provider's accepted `duration` range is narrower than most
    /// requested buffer widths; per the source, the request always asks
    /// for the provider's maximum (10s) and the *actual* returned clip
    /// length is what downstream splicing uses (§9 Design Notes #2).
    pub async fn generate_video(
        &self,
        video_url: &str,
        prompt: &str,
        resolution: &str,
        negative_prompt: &str,
        enable_prompt_expansion: bool,
        seed: i64,
    ) -> Result<GenerationResult> {
        let payload = json!({
            "duration": 10,
            "enable_prompt_expansion": enable_prompt_expansion,
            "negative_prompt": negative_prompt,
            "prompt": prompt,
            "resolution": resolution,
            "seed": seed,
            "video": video_url,
        });

        let started = Instant::now();

        let response = self
            .http
            .post(format!("{}/alibaba/wan-2.5/video-extend", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PipelineError::GenerationUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::GenerationUnreachable(format!(
                "submit returned {status}: {body}"
            )));
        }

        let envelope: SubmitEnvelope = response
            .json()
            .await
            .map_err(|e| PipelineError::GenerationUnreachable(e.to_string()))?;
        let request_id = envelope.data.id;
        info!("submitted generation task {request_id}");

        let result = self.poll_for_result(&request_id, started).await;
        metrics::record_generation_call(match &result {
            Ok(_) => "ok",
            Err(PipelineError::GenerationTimeout(_)) => "timeout",
            Err(_) => "unreachable",
        });
        result
    }

    async fn poll_for_result(&self, request_id: &str, started: Instant) -> Result<GenerationResult> {
        let url = format!("{}/predictions/{request_id}/result", self.base_url);
        let mut consecutive_errors = 0u32;

        loop {
            let elapsed = started.elapsed();
            if elapsed > self.timeout {
                return Err(PipelineError::GenerationTimeout(elapsed.as_secs_f64()));
            }

            match self.poll_once(&url).await {
                Ok(PollOutcome::Completed(output_url)) => {
                    return Ok(GenerationResult {
                        output_url,
                        elapsed_s: elapsed.as_secs_f64(),
                        request_id: request_id.to_string(),
                    });
                }
                Ok(PollOutcome::Failed(message)) => {
                    return Err(PipelineError::GenerationUnreachable(message));
                }
                Ok(PollOutcome::Pending(status)) => {
                    consecutive_errors = 0;
                    info!("generation {request_id} status={status} ({:.1}s elapsed)", elapsed.as_secs_f64());
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors >= self.max_consecutive_errors {
                        return Err(PipelineError::GenerationUnreachable(format!(
                            "exhausted retry budget: {e}"
                        )));
                    }
                    let backoff = self.poll_interval * 2;
                    warn!(
                        "poll error ({consecutive_errors}/{}): {e}, retrying in {:?}",
                        self.max_consecutive_errors, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn poll_once(&self, url: &str) -> std::result::Result<PollOutcome, String> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{status}: {body}"));
        }

        let envelope: PollEnvelope = response.json().await.map_err(|e| e.to_string())?;

        match envelope.data.status.as_str() {
            "completed" => envelope
                .data
                .outputs
                .into_iter()
                .next()
                .map(PollOutcome::Completed)
                .ok_or_else(|| "completed with no outputs".to_string()),
            "failed" => Ok(PollOutcome::Failed(
                envelope.data.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
            other => Ok(PollOutcome::Pending(other.to_string())),
        }
    }

    /// Stream-download the generated clip to `out`.
    pub async fn download(&self, url: &str, out: &Path) -> Result<()> {
        let response = self.http.get(url).send().await?;
        let mut file = tokio::fs::File::create(out).await?;
        let mut stream = futures::StreamExt::map(response.bytes_stream(), |chunk| {
            chunk.map_err(|e| PipelineError::Internal(e.to_string()))
        });

        use futures::TryStreamExt;
        use tokio::io::AsyncWriteExt;
        while let Some(chunk) = stream.try_next().await? {
            file.write_all(&chunk).await?;
        }
        Ok(())
    }
}

enum PollOutcome {
    Completed(String),
    Failed(String),
    Pending(String),
}
