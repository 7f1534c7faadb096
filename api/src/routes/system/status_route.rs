//! GET /status: whether an index is loaded.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::app::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// `ok`, `not_ready` or `error`.
    pub status: &'static str,
    pub index_loaded: bool,
    pub message: String,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let Some(qa) = &state.qa else {
        return Json(StatusResponse {
            status: "error",
            index_loaded: false,
            message: "Vector store not initialized".to_string(),
        });
    };

    let loaded = qa.is_loaded().await;
    Json(StatusResponse {
        status: if loaded { "ok" } else { "not_ready" },
        index_loaded: loaded,
        message: if loaded {
            "System ready".to_string()
        } else {
            "Index not loaded. Use /initialize to create index.".to_string()
        },
    })
}
