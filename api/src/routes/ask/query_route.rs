//! POST /query: answers a health question from the index.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::HeaderMap};
use tracing::{debug, error, info};

use crate::{
    app::app_state::AppState,
    error_handler::{AppError, AppResult},
    middleware_layer::request_id::request_id_of,
    routes::ask::query_request::{QueryRequest, QueryResponse},
};

/// Handler: POST /query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/query \
///   -H 'content-type: application/json' \
///   -d '{"question":"How can I bring down a mild fever at home?"}'
/// ```
pub async fn query(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<QueryResponse>> {
    let Json(body) = body?;
    let request_id = request_id_of(&headers);

    let qa = state.qa.as_ref().ok_or_else(|| {
        AppError::NotReady("Vector store not initialized. Use /initialize endpoint first.".to_string())
    })?;

    info!(request_id = %request_id, question = %body.question, "Processing query");
    let answer = qa.query(&body.question).await.inspect_err(|e| {
        error!(request_id = %request_id, error = %e, "Error processing query");
    })?;
    debug!(request_id = %request_id, answer_len = answer.len(), "query: success");

    Ok(Json(QueryResponse {
        answer,
        success: true,
    }))
}
