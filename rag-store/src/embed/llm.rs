//! Embedding provider backed by the shared LLM service profiles.
//!
//! Delegates to `LlmServiceProfiles::embed`, which routes to Ollama or
//! OpenAI and retries transient failures.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;

use crate::embed::{EmbeddingFingerprint, EmbeddingsProvider};
use crate::errors::RagError;

/// Embedder using the **embedding** profile of [`LlmServiceProfiles`].
#[derive(Clone)]
pub struct LlmEmbedder {
    pub svc: Arc<LlmServiceProfiles>,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>
    {
        Box::pin(async move { Ok(self.svc.embed(text).await?) })
    }

    fn fingerprint(&self) -> EmbeddingFingerprint {
        let (_, embedding) = self.svc.profiles();
        EmbeddingFingerprint {
            provider: embedding.provider.as_str().to_string(),
            model: embedding.model.clone(),
        }
    }
}
