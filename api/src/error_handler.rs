use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dataset_loader::DatasetError;
use rag_store::RagError;
use serde::Serialize;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Domain ---
    /// Dataset could not be fetched or turned into documents.
    #[error(transparent)]
    Ingestion(#[from] DatasetError),

    /// No index is loaded yet.
    #[error("{0}")]
    NotReady(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    /// Maps an index error; `code` labels failures that are neither
    /// "not ready" nor upstream model failures.
    pub fn from_rag(err: RagError, code: &'static str) -> Self {
        match err {
            RagError::NotReady => AppError::NotReady(err.to_string()),
            RagError::Upstream(_) => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "UPSTREAM_FAILURE",
                message: err.to_string(),
            },
            other => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code,
                message: other.to_string(),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Http { status, .. } => *status,
            AppError::Config(_)
            | AppError::Ingestion(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::Ingestion(_) => "INGESTION_FAILED",
            AppError::NotReady(_) => "INDEX_NOT_READY",
            AppError::Http { code, .. } => code,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Keeps axum's status (400, 415 or 422) for malformed JSON bodies.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        let status = err.status();
        AppError::Http {
            status,
            code: rejection_code(status),
            message: err.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        let status = err.status();
        AppError::Http {
            status,
            code: rejection_code(status),
            message: err.body_text(),
        }
    }
}

fn rejection_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        _ => "BAD_REQUEST",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rag_errors_map_to_codes() {
        let e = AppError::from_rag(RagError::NotReady, "QUERY_FAILED");
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.error_code(), "INDEX_NOT_READY");
        assert_eq!(
            e.to_string(),
            "Vector store not initialized. Use /initialize endpoint first."
        );

        let e = AppError::from_rag(
            RagError::Upstream(ai_llm_service::AiLlmError::Timeout(std::time::Duration::from_secs(60))),
            "QUERY_FAILED",
        );
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "UPSTREAM_FAILURE");
        assert!(e.to_string().starts_with("upstream model failure: "));

        let e = AppError::from_rag(RagError::Store("boom".into()), "RESET_FAILED");
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "RESET_FAILED");
    }

    #[test]
    fn ingestion_errors_are_500() {
        let e = AppError::from(DatasetError::FieldDetection);
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "INGESTION_FAILED");
        assert_eq!(e.to_string(), "Could not detect text fields in dataset items.");
    }
}
