use axum::Json;
use serde_json::{Value, json};

/// Handler: GET /health. Liveness only; never touches the index.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
