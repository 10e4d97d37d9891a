use axum::Json;
use serde_json::{Value, json};

/// GET /health - Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
