use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": state.settings.model,
        "provider": state.pipeline.provider_name(),
        "tracing_enabled": state.pipeline.tracing_enabled(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}
