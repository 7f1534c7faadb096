//! POST /reset: drops the collection.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::{error, warn};

use crate::{
    app::app_state::AppState, error_handler::AppResult, routes::index::index_dto::ResetResponse,
};

pub async fn reset(State(state): State<Arc<AppState>>) -> AppResult<Json<ResetResponse>> {
    // Nothing was built, so there is nothing to drop.
    if let Some(qa) = &state.qa {
        qa.reset().await.inspect_err(|e| {
            error!(error = %e, "Error resetting index");
        })?;
        warn!("Vector store reset");
    }

    Ok(Json(ResetResponse {
        success: true,
        message: "Vector store reset successfully".to_string(),
    }))
}
