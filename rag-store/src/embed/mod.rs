use crate::errors::RagError;
use std::{future::Future, pin::Pin};

/// Identity of an embedding space: vectors from different fingerprints are
/// not comparable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddingFingerprint {
    pub provider: String,
    pub model: String,
}

/// Provider interface for embedding generation.
///
/// Async is required because real providers (Ollama, OpenAI) perform HTTP requests.
/// Implement this trait to plug in another embedding backend.
pub trait EmbeddingsProvider: Send + Sync {
    /// Async embedding function.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>;

    /// Provider and model producing the vectors.
    fn fingerprint(&self) -> EmbeddingFingerprint;
}

pub mod llm;
