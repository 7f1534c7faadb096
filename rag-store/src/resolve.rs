//! Picks the final answer text: synthesized answer, raw passages, or apology.

use tracing::{info, warn};

use crate::{
    config::SIMILARITY_TOP_K,
    engine::{EMPTY_RESPONSE, EngineResponse},
    errors::RagError,
    record::QueryResult,
    retrieve::Retrieve,
};

pub const PREAMBLE: &str =
    "I could not synthesize a full answer, but here is relevant information from the knowledge base:\n\n";

pub const APOLOGY: &str = "I could not find relevant information in the knowledge base.";

/// Resolves an engine response into the answer returned to the caller.
///
/// The raw retriever runs only when the response carries no source nodes.
pub async fn resolve(
    question: &str,
    response: EngineResponse,
    retriever: &dyn Retrieve,
) -> Result<QueryResult, RagError> {
    let text = response.text.trim();
    if !text.is_empty() && text != EMPTY_RESPONSE {
        return Ok(QueryResult {
            answer: text.to_string(),
            synthesized: true,
        });
    }

    warn!("Synthesis returned no usable text, falling back to raw passages");
    let passages = if response.source_nodes.is_empty() {
        retriever.retrieve(question).await?
    } else {
        response.source_nodes
    };

    let snippets: Vec<&str> = passages
        .iter()
        .take(SIMILARITY_TOP_K)
        .map(|n| n.content.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if snippets.is_empty() {
        info!("No passages available for fallback");
        return Ok(QueryResult {
            answer: APOLOGY.to_string(),
            synthesized: false,
        });
    }

    Ok(QueryResult {
        answer: format!("{PREAMBLE}{}", snippets.join("\n\n")),
        synthesized: false,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        future::Future,
        pin::Pin,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::record::RetrievedNode;

    struct Canned {
        nodes: Vec<RetrievedNode>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new(contents: &[&str]) -> Self {
            Self {
                nodes: contents.iter().map(|c| node(c)).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Retrieve for Canned {
        fn retrieve<'a>(
            &'a self,
            _question: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<RetrievedNode>, RagError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(self.nodes.clone()) })
        }
    }

    fn node(content: &str) -> RetrievedNode {
        RetrievedNode {
            content: content.to_string(),
            score: 0.5,
            doc_id: "d".into(),
            seq: 0,
            metadata: BTreeMap::new(),
        }
    }

    fn response(text: &str, sources: &[&str]) -> EngineResponse {
        EngineResponse {
            text: text.to_string(),
            source_nodes: sources.iter().map(|c| node(c)).collect(),
        }
    }

    #[tokio::test]
    async fn synthesized_answer_is_trimmed_and_kept() {
        let r = Canned::new(&["unused"]);
        let out = resolve("q", response("  Rest and fluids.\n", &["ctx"]), &r).await.unwrap();
        assert_eq!(out.answer, "Rest and fluids.");
        assert!(out.synthesized);
        assert_eq!(r.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_answer_uses_source_nodes_without_retrieving() {
        let r = Canned::new(&["should not appear"]);
        let out = resolve("q", response("", &[" P1 ", "", "P2", "P3", "P4"]), &r).await.unwrap();
        assert_eq!(out.answer, format!("{PREAMBLE}P1\n\nP2"));
        assert!(!out.synthesized);
        assert_eq!(r.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sentinel_without_sources_runs_raw_retriever() {
        let r = Canned::new(&["P1", "P2", "P3", "P4"]);
        let out = resolve("q", response("Empty Response", &[]), &r).await.unwrap();
        assert_eq!(out.answer, format!("{PREAMBLE}P1\n\nP2\n\nP3"));
        assert_eq!(r.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn nothing_found_yields_apology() {
        let r = Canned::new(&["   "]);
        let out = resolve("q", response(" ", &[]), &r).await.unwrap();
        assert_eq!(out.answer, APOLOGY);
        assert!(!out.synthesized);
    }
}
