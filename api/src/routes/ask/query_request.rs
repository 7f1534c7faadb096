use serde::{Deserialize, Serialize};

/// Request payload for /query.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Free-text health question.
    pub question: String,
}

/// Response payload for /query.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub success: bool,
}
