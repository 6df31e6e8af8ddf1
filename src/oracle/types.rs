use serde::{Deserialize, Serialize};

/// Product descriptor, opaque to the pipeline except as template
/// substitutions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub company: String,
    pub product: String,
    pub category: String,
}

/// Viewer profile, consumed but never produced here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ViewerProfile {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub demographics: serde_json::Value,
    #[serde(default)]
    pub content_preferences: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub product_affinities: Vec<String>,
}

/// One ranked candidate insertion point from Pass 1. `buffer_start`/
/// `buffer_end` are optional on the wire (the oracle may omit them,
/// leaving buffer derivation to the caller per §4.4).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub rank: u32,
    pub insertion_point: f64,
    #[serde(default)]
    pub buffer_start: Option<f64>,
    #[serde(default)]
    pub buffer_end: Option<f64>,
    pub reason: String,
    #[serde(default)]
    pub transcript_context: String,
}

/// Pass 2's vision-based selection among candidate frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisionSelection {
    pub selected_index: i64,
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub visual_description: String,
    #[serde(default)]
    pub has_people: bool,
    #[serde(default)]
    pub is_transition_shot: bool,
    #[serde(default)]
    pub how_product_fits: String,
    pub why_selected: String,
    #[serde(default)]
    pub why_others_rejected: String,
}

/// Final placement decision: a candidate enriched with confidence and
/// surrounding-context summaries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Placement {
    pub insertion_point: f64,
    pub buffer_start: f64,
    pub buffer_end: f64,
    pub confidence: f64,
    pub reason: String,
    pub visual_description: String,
    #[serde(default)]
    pub rejection_notes: String,
    pub summary_before: String,
    pub summary_after: String,
}
