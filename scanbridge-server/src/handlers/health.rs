use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "devices": state.registry.len(),
        "viewers": state.hub.viewer_count(),
        "timestamp": chrono::Utc::now(),
    }))
}
