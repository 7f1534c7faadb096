use std::sync::Arc;

use tracing::error;

use crate::app::qa_service::QaService;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the service could not be built at startup.
    pub qa: Option<Arc<QaService>>,
    /// Why `qa` is missing.
    pub startup_error: Option<String>,
}

impl AppState {
    pub fn ready(qa: QaService) -> Self {
        Self {
            qa: Some(Arc::new(qa)),
            startup_error: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            qa: None,
            startup_error: Some(reason.into()),
        }
    }

    /// Builds the service from environment and reopens a persisted index.
    ///
    /// Construction failures do not stop the server; `/status` reports them.
    pub async fn from_env() -> Self {
        match QaService::from_env() {
            Ok(qa) => {
                qa.load_existing().await;
                Self::ready(qa)
            }
            Err(e) => {
                error!(error = %e, "Error during startup");
                Self::unavailable(e.to_string())
            }
        }
    }
}
