use std::time::Instant;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::metrics;
use crate::server::state::AppState;

#[derive(Deserialize)]
pub struct ProfileAnalyzeRequest {
    platform_data: Value,
}

#[derive(Serialize)]
pub struct ProfileAnalyzeResponse {
    user_info: Value,
    platform_data: Value,
    analysis: Value,
    final_decision: Value,
}

/// `POST /api/v1/profile/analyze` (§6). Delegates the inference itself to
/// the Placement Oracle's `profile_infer` task; this handler only shapes
/// the oracle's JSON into the four-field envelope the spec names.
pub async fn analyze_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ProfileAnalyzeRequest>,
) -> Result<Response> {
    let start = Instant::now();

    let analysis = state.controller.oracle().profile_infer(&req.platform_data).await?;

    let final_decision = analysis.get("final_decision").cloned().unwrap_or(Value::Null);
    let user_info = serde_json::json!({ "id": user.id, "email": user.email });

    metrics::record_request("profile_analyze", 200);
    metrics::record_duration("profile_analyze", start);

    Ok(Json(ProfileAnalyzeResponse {
        user_info,
        platform_data: req.platform_data,
        analysis,
        final_decision,
    })
    .into_response())
}
