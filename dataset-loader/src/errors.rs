//! Unified error type for the dataset-loader crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while loading a dataset and building documents.
///
/// Every variant is fatal for the ingestion call that raised it.
#[derive(Debug, Error)]
pub enum DatasetError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Content ─────────────────────────────────────────────────────────────
    /// No usable question/answer fields in the first record.
    #[error("Could not detect text fields in dataset items.")]
    FieldDetection,

    /// A JSONL line or a rows page could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    // ── I/O & transport ─────────────────────────────────────────────────────
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error while talking to the datasets server.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Datasets server answered with a non-success status.
    #[error("datasets server returned {status} for {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },
}
