use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::metrics;
use crate::oracle::prompts;
use crate::oracle::types::{Candidate, Placement, Product, ViewerProfile, VisionSelection};
use crate::subtitle::Gap;

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct CandidatesEnvelope {
    candidates: Vec<Candidate>,
}

/// Transport for every oracle task (`Analyze`, `Candidates`,
/// `VisionSelect`, `ProfileInfer`, `ProductMatch`). One typed method per
/// task, all funneled through `chat`, which is the one HTTP boundary.
#[derive(Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    vision_model: String,
}

impl OracleClient {
    pub fn new(base_url: String, api_key: String, model: String, vision_model: String, timeout_s: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_s))
            .build()
            .expect("reqwest client build");
        Self {
            http,
            base_url,
            api_key,
            model,
            vision_model,
        }
    }

    async fn chat(&self, mut payload: Value, model: &str) -> Result<String> {
        payload["model"] = Value::String(model.to_string());

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PipelineError::OracleUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::OracleUnreachable(format!(
                "oracle returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::OracleUnreachable(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::OracleParse("empty choices array".to_string()))
    }

    /// Parse a typed JSON envelope from oracle content, with one recovery
    /// pass extracting the first `{...}` substring on initial failure.
    fn parse_json<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
        if let Ok(value) = serde_json::from_str::<T>(content) {
            return Ok(value);
        }
        let recovered = extract_json_object(content)
            .ok_or_else(|| PipelineError::OracleParse("no JSON object found".to_string()))?;
        serde_json::from_str::<T>(recovered)
            .map_err(|e| PipelineError::OracleParse(format!("recovery parse failed: {e}")))
    }

    /// Record `task`'s outcome against `ORACLE_CALLS` regardless of which
    /// way `fut` resolves, then hand the result straight through.
    async fn instrumented<T>(task: &str, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        let result = fut.await;
        metrics::record_oracle_call(task, if result.is_ok() { "ok" } else { "error" });
        result
    }

    /// Pass 1: transcript-based candidate generation.
    pub async fn find_candidates(
        &self,
        gaps: &[Gap],
        transcript_summary: &str,
        product: &Product,
        profile: &ViewerProfile,
        num_candidates: usize,
    ) -> Result<Vec<Candidate>> {
        Self::instrumented("candidates", async {
            let payload = prompts::candidates_prompt(gaps, transcript_summary, product, profile, num_candidates);
            let content = self.chat(payload, &self.model).await?;
            let envelope: CandidatesEnvelope = Self::parse_json(&content)?;

            if envelope.candidates.is_empty() {
                return Err(PipelineError::NoCandidates);
            }
            Ok(envelope.candidates)
        })
        .await
    }

    /// Pass 2: vision-based frame selection. `candidates` pairs each
    /// candidate with its base64-encoded extracted frame.
    pub async fn select_best_placement_from_frames(
        &self,
        candidates: &[(Candidate, String)],
        product: &Product,
    ) -> Result<VisionSelection> {
        Self::instrumented("vision-select", async {
            let payload = prompts::vision_prompt(candidates, product);
            let content = self.chat(payload, &self.vision_model).await?;
            let mut selection: VisionSelection = Self::parse_json(&content)?;

            if selection.selected_index < 0 || selection.selected_index as usize >= candidates.len() {
                selection.selected_index = 0;
            }
            Ok(selection)
        })
        .await
    }

    /// Single-pass transcript-only placement. `media_duration` clamps
    /// `buffer_end` per §4.4/§8 ("placement near media_duration clamps
    /// buffer_end to media_duration") — applied to both the oracle's own
    /// `buffer_end` and the `insertion_point + buffer_after` fallback, so
    /// the §3 invariant `buffer_end <= media_duration` holds regardless of
    /// which one was used.
    pub async fn analyze(
        &self,
        gaps: &[Gap],
        transcript_summary: &str,
        product: &Product,
        profile: &ViewerProfile,
        buffer_before: f64,
        buffer_after: f64,
        media_duration: f64,
    ) -> Result<Placement> {
        Self::instrumented("analyze", async {
            let payload =
                prompts::analyze_prompt(gaps, transcript_summary, product, profile, buffer_before, buffer_after);
            let content = self.chat(payload, &self.model).await?;

            #[derive(Deserialize)]
            struct AnalyzeResponse {
                insertion_point: f64,
                #[serde(default)]
                buffer_start: Option<f64>,
                #[serde(default)]
                buffer_end: Option<f64>,
                confidence: f64,
                reason: String,
                #[serde(default)]
                summary_before: String,
                #[serde(default)]
                summary_after: String,
            }

            let parsed: AnalyzeResponse = Self::parse_json(&content)?;

            Ok(Placement {
                insertion_point: parsed.insertion_point,
                buffer_start: parsed.buffer_start.unwrap_or((parsed.insertion_point - buffer_before).max(0.0)),
                buffer_end: parsed
                    .buffer_end
                    .unwrap_or(parsed.insertion_point + buffer_after)
                    .min(media_duration),
                confidence: parsed.confidence,
                reason: parsed.reason,
                visual_description: String::new(),
                rejection_notes: String::new(),
                summary_before: parsed.summary_before,
                summary_after: parsed.summary_after,
            })
        })
        .await
    }

    /// Viewer-profile inference, backing `/profile/analyze`.
    pub async fn profile_infer(&self, platform_data: &Value) -> Result<Value> {
        Self::instrumented("profile-infer", async {
            let payload = prompts::profile_infer_prompt(platform_data);
            let content = self.chat(payload, &self.model).await?;
            Self::parse_json(&content)
        })
        .await
    }
}

fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end > start { Some(&s[start..=end]) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_object_finds_embedded_object() {
        let s = "here is your answer: {\"a\": 1} thanks!";
        assert_eq!(extract_json_object(s), Some("{\"a\": 1}"));
    }

    #[test]
    fn extract_json_object_none_when_absent() {
        assert_eq!(extract_json_object("no json here"), None);
    }
}
