use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::api::AppState;

/// Liveness probe; needs no identity header.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "running": state.coordinator.locks().running(),
    }))
}
