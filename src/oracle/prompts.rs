use crate::oracle::types::{Product, ViewerProfile};
use crate::subtitle::Gap;
use serde_json::json;

const CANDIDATES_SCHEMA_HINT: &str = r#"Respond with strict JSON only, of the exact shape:
{"candidates": [{"rank": 1, "insertion_point": 123.4, "buffer_start": 113.4, "buffer_end": 126.4, "reason": "...", "transcript_context": "..."}]}"#;

const VISION_SCHEMA_HINT: &str = r#"Respond with strict JSON only, of the exact shape:
{"selected_index": 0, "timestamp": 123.4, "visual_description": "...", "has_people": true, "is_transition_shot": false, "how_product_fits": "...", "why_selected": "...", "why_others_rejected": "..."}"#;

/// Up to 15 gaps, 80-char context windows either side, as the source
/// truncates when formatting gap context for the prompt.
fn format_gaps(gaps: &[Gap]) -> String {
    gaps.iter()
        .take(15)
        .map(|g| {
            let before = truncate_tail(&g.context_before, 80);
            let after = truncate_head(&g.context_after, 80);
            format!(
                "gap [{:.1}s - {:.1}s, {:.1}s]: ...{} | {}...",
                g.start, g.end, g.duration, before, after
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_tail(s: &str, n: usize) -> &str {
    if s.len() <= n { s } else { &s[s.len() - n..] }
}

fn truncate_head(s: &str, n: usize) -> &str {
    if s.len() <= n { s } else { &s[..n] }
}

/// Build the candidate-generation (Pass 1) prompt messages.
pub fn candidates_prompt(
    gaps: &[Gap],
    transcript_summary: &str,
    product: &Product,
    profile: &ViewerProfile,
    num_candidates: usize,
) -> serde_json::Value {
    let system = format!(
        "You are an expert at identifying natural advertisement insertion points in video content. \
         Prefer scene transitions and dialogue gaps; avoid climactic beats; prefer thematic adjacency \
         to the product category; respect user interests. Propose up to {num_candidates} candidates \
         ranked by quality. {CANDIDATES_SCHEMA_HINT}"
    );

    let user = format!(
        "Product: {} by {} ({})\nViewer interests: {}\n\nDialogue gaps:\n{}\n\nTranscript summary:\n{}",
        product.product,
        product.company,
        product.category,
        if profile.interests.is_empty() {
            "general audience".to_string()
        } else {
            profile.interests.join(", ")
        },
        format_gaps(gaps),
        transcript_summary,
    );

    json!({
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": user},
        ],
        "temperature": 0.3,
        "response_format": {"type": "json_object"},
    })
}

/// Build the vision-selection (Pass 2) prompt with one image block per
/// candidate frame, interleaved with its transcript reasoning.
pub fn vision_prompt(
    candidates: &[(crate::oracle::types::Candidate, String)],
    product: &Product,
) -> serde_json::Value {
    let mut content = vec![json!({
        "type": "text",
        "text": format!(
            "Select the best frame to insert an ad for {} by {}. Reject establishing, aerial, or \
             transition shots with no human subject; prefer scenes where the product could \
             plausibly appear. {VISION_SCHEMA_HINT}",
            product.product, product.company
        )
    })];

    for (i, (candidate, frame_b64)) in candidates.iter().enumerate() {
        content.push(json!({
            "type": "text",
            "text": format!(
                "Candidate {i}: t={:.1}s, reason: {}",
                candidate.insertion_point, candidate.reason
            )
        }));
        content.push(json!({
            "type": "image_url",
            "image_url": {"url": format!("data:image/jpeg;base64,{frame_b64}")}
        }));
    }

    json!({
        "messages": [
            {"role": "user", "content": content},
        ],
        "temperature": 0.3,
        "response_format": {"type": "json_object"},
    })
}

/// Single-pass (transcript-only) analysis prompt.
pub fn analyze_prompt(
    gaps: &[Gap],
    transcript_summary: &str,
    product: &Product,
    profile: &ViewerProfile,
    buffer_before: f64,
    buffer_after: f64,
) -> serde_json::Value {
    let system = format!(
        "You are selecting a single advertisement insertion point from a transcript alone. \
         Return a buffer window of {buffer_before:.1}s before and {buffer_after:.1}s after the \
         insertion point. Respond with strict JSON: {{\"insertion_point\": 0.0, \"buffer_start\": \
         0.0, \"buffer_end\": 0.0, \"confidence\": 0.0, \"reason\": \"...\", \"summary_before\": \
         \"...\", \"summary_after\": \"...\"}}"
    );
    let user = format!(
        "Product: {} by {} ({})\nViewer interests: {}\n\nDialogue gaps:\n{}\n\nTranscript summary:\n{}",
        product.product,
        product.company,
        product.category,
        profile.interests.join(", "),
        format_gaps(gaps),
        transcript_summary,
    );

    json!({
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": user},
        ],
        "temperature": 0.3,
        "response_format": {"type": "json_object"},
    })
}

/// Viewer-profile inference prompt, used by `/profile/analyze`. Oracle
/// temperature for profile inference is higher (0.5-0.6) than the
/// analytical stages per §4.4.
pub fn profile_infer_prompt(platform_data: &serde_json::Value) -> serde_json::Value {
    let system = "Infer demographic and interest signals from the given platform data. \
                   Respond with strict JSON describing the inferred viewer profile.";
    json!({
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": platform_data.to_string()},
        ],
        "temperature": 0.55,
        "response_format": {"type": "json_object"},
    })
}
