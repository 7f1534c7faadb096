use serde::{Deserialize, Serialize};

/// Default number of dataset rows for `/initialize`. `max_samples=0` loads
/// the whole split.
pub const DEFAULT_MAX_SAMPLES: usize = 1000;

/// Query string of `/initialize`.
#[derive(Debug, Deserialize)]
pub struct InitializeParams {
    #[serde(default)]
    pub max_samples: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub message: String,
    pub documents_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}
