//! Generative model seam used for answer synthesis.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::LlmServiceProfiles;

use crate::errors::RagError;

/// Completes a prompt with an optional system instruction.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        system: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String, RagError>> + Send + 'a>>;
}

/// Chat model using the **chat** profile of [`LlmServiceProfiles`].
#[derive(Clone)]
pub struct LlmChat {
    pub svc: Arc<LlmServiceProfiles>,
}

impl LlmChat {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

impl ChatModel for LlmChat {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        system: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String, RagError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.svc.generate(prompt, system).await?) })
    }
}
