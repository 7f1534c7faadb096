//! Unified error types for the crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Query issued before an index was created or loaded.
    #[error("Vector store not initialized. Use /initialize endpoint first.")]
    NotReady,

    /// Embedding or generation provider failed (timeouts included).
    #[error("upstream model failure: {0}")]
    Upstream(#[from] AiLlmError),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Stored collection was built with a different embedding space.
    #[error("incompatible index: {0}")]
    Incompatible(String),

    /// Nothing to index.
    #[error("no documents to index")]
    EmptyInput,

    /// Vector store backend errors (Qdrant client, snapshot layout).
    #[error("store error: {0}")]
    Store(String),
}
