//! POST /initialize: loads the dataset and builds the index.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use tracing::{error, info};

use crate::{
    app::app_state::AppState,
    error_handler::{AppError, AppResult},
    middleware_layer::request_id::request_id_of,
    routes::index::index_dto::{DEFAULT_MAX_SAMPLES, InitializeParams, InitializeResponse},
};

/// Handler: POST /initialize?max_samples=N
///
/// # Example
/// ```bash
/// curl -X POST 'http://127.0.0.1:8000/initialize?max_samples=500'
/// ```
pub async fn initialize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<InitializeParams>, QueryRejection>,
) -> AppResult<Json<InitializeResponse>> {
    let Query(params) = params?;
    let max_samples = params.max_samples.unwrap_or(DEFAULT_MAX_SAMPLES);
    let request_id = request_id_of(&headers);

    let qa = state.qa.as_ref().ok_or_else(|| {
        AppError::Config(
            state
                .startup_error
                .clone()
                .unwrap_or_else(|| "Vector store not initialized".to_string()),
        )
    })?;

    info!(request_id = %request_id, max_samples, "Initializing index");
    let count = qa.initialize(max_samples).await.inspect_err(|e| {
        error!(request_id = %request_id, error = %e, "Error initializing index");
    })?;

    Ok(Json(InitializeResponse {
        success: true,
        message: format!("Index initialized with {count} documents"),
        documents_count: count,
    }))
}
