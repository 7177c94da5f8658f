use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::manifest::runner;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RunPayload {
    /// When set, that user's run proceeds regardless of the hour gate.
    pub user_id: Option<i32>,
}

/// Manual/forced invocation surface. The scheduled path goes through
/// `jobs::scheduler` instead; both end up in the same runner.
pub async fn run_manifests(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<RunPayload>>,
) -> (StatusCode, Json<Value>) {
    let forced_user = payload.and_then(|Json(p)| p.user_id);
    match runner::run_invocation(
        &state.repository,
        state.speech.as_ref(),
        state.store.as_ref(),
        forced_user,
        Utc::now(),
    )
    .await
    {
        Ok(report) => match serde_json::to_value(&report) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Failed to serialize run report: {}", e) })),
            ),
        },
        Err(e) => {
            tracing::error!("Manifest run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
