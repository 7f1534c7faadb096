//! Query engine: retrieve, then synthesize over a compact context block.

use tracing::{debug, trace};

use crate::{
    chat::ChatModel,
    errors::RagError,
    prompt::{CONTEXT_MAX_CHARS, DEFAULT_SYSTEM, build_user_prompt},
    record::RetrievedNode,
    retrieve::Retrieve,
};

/// Sentinel text when there is nothing to synthesize from.
pub const EMPTY_RESPONSE: &str = "Empty Response";

/// Synthesized text plus the passages it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineResponse {
    pub text: String,
    pub source_nodes: Vec<RetrievedNode>,
}

pub struct QueryEngine<'a> {
    pub retriever: &'a dyn Retrieve,
    pub chat: &'a dyn ChatModel,
}

impl QueryEngine<'_> {
    pub async fn query(&self, question: &str) -> Result<EngineResponse, RagError> {
        let source_nodes = self.retriever.retrieve(question).await?;
        if source_nodes.is_empty() {
            debug!("QueryEngine::query: no passages retrieved");
            return Ok(EngineResponse {
                text: EMPTY_RESPONSE.to_string(),
                source_nodes,
            });
        }

        let prompt = build_user_prompt(question, &source_nodes, CONTEXT_MAX_CHARS);
        trace!("QueryEngine::query prompt_len={}", prompt.len());
        let text = self.chat.complete(&prompt, Some(DEFAULT_SYSTEM)).await?;

        Ok(EngineResponse { text, source_nodes })
    }
}
