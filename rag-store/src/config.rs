//! Runtime and collection configuration.

use std::{path::PathBuf, str::FromStr};

use crate::errors::RagError;

/// Collection name shared by every backend.
pub const COLLECTION: &str = "medical_wikidoc";

/// Passages retrieved per query, for synthesis and for the raw fallback.
pub const SIMILARITY_TOP_K: usize = 3;

/// Which vector store holds the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process vectors persisted as a JSON snapshot under `persist_dir`.
    Local,
    /// Remote Qdrant server.
    Qdrant,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Qdrant => "qdrant",
        }
    }
}

impl FromStr for BackendKind {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Ok(BackendKind::Local),
            "qdrant" => Ok(BackendKind::Qdrant),
            other => Err(RagError::Config(format!(
                "VECTOR_BACKEND must be 'local' or 'qdrant', got '{other}'"
            ))),
        }
    }
}

/// Configuration for indexing and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Directory holding the manifest (and the snapshot for the local backend).
    pub persist_dir: PathBuf,
    /// Target collection name.
    pub collection: String,
    pub backend: BackendKind,
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Maximum concurrent embedding calls during indexing.
    pub embedding_concurrency: usize,
    /// Upper bound on node length in characters.
    pub chunk_max_chars: usize,
    pub top_k: usize,
}

impl RagConfig {
    /// Creates a sane default config rooted at `persist_dir`.
    pub fn new_default(persist_dir: impl Into<PathBuf>) -> Self {
        Self {
            persist_dir: persist_dir.into(),
            collection: COLLECTION.to_string(),
            backend: BackendKind::Local,
            qdrant_url: "http://localhost:6334".to_string(),
            qdrant_api_key: None,
            upsert_batch: 256,
            embedding_concurrency: 4,
            chunk_max_chars: 8000,
            top_k: SIMILARITY_TOP_K,
        }
    }

    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `INDEX_PERSIST_DIR` (default: `./vector_store`)
    /// - `VECTOR_BACKEND` (`local` | `qdrant`, default: `local`)
    /// - `QDRANT_URL` (default: `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `UPSERT_BATCH_SIZE` (default: 256)
    /// - `EMBEDDING_CONCURRENCY` (default: 4)
    /// - `CHUNK_MAX_CHARS` (default: 8000)
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(
            read_env("INDEX_PERSIST_DIR").unwrap_or_else(|| "./vector_store".to_string()),
        );

        if let Some(v) = read_env("VECTOR_BACKEND") {
            cfg.backend = v.parse()?;
        }
        if let Some(v) = read_env("QDRANT_URL") {
            cfg.qdrant_url = v;
        }
        cfg.qdrant_api_key = read_env("QDRANT_API_KEY");
        if let Some(n) = read_usize_env("UPSERT_BATCH_SIZE")? {
            cfg.upsert_batch = n;
        }
        if let Some(n) = read_usize_env("EMBEDDING_CONCURRENCY")? {
            cfg.embedding_concurrency = n;
        }
        if let Some(n) = read_usize_env("CHUNK_MAX_CHARS")? {
            cfg.chunk_max_chars = n;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.backend == BackendKind::Qdrant && self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_concurrency == 0 {
            return Err(RagError::Config("embedding_concurrency must be > 0".into()));
        }
        if self.chunk_max_chars < 16 {
            return Err(RagError::Config("chunk_max_chars must be >= 16".into()));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be > 0".into()));
        }
        Ok(())
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read an optional `usize` from env.
fn read_usize_env(key: &str) -> Result<Option<usize>, RagError> {
    match read_env(key) {
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("failed to parse env variable: {key} = '{v}'"))),
        None => Ok(None),
    }
}
