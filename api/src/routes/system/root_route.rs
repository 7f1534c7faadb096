//! GET /: service banner and endpoint map.

use axum::Json;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to AI Doctor - Wellness Advice API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "status": "/status",
            "initialize": "/initialize",
            "query": "/query",
            "reset": "/reset"
        }
    }))
}
