//! Retrieval: embed the query text and search the store.

use std::{future::Future, pin::Pin};

use tracing::trace;

use crate::{
    embed::EmbeddingsProvider, errors::RagError, record::RetrievedNode, store::VectorStore,
};

/// Returns passages related to a question, best first.
pub trait Retrieve: Send + Sync {
    fn retrieve<'a>(
        &'a self,
        question: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RetrievedNode>, RagError>> + Send + 'a>>;
}

/// Top-k similarity retriever over a [`VectorStore`].
pub struct VectorRetriever<'a> {
    pub store: &'a VectorStore,
    pub embedder: &'a dyn EmbeddingsProvider,
    pub top_k: usize,
    /// Dimension of the collection; query vectors must match it.
    pub dim: usize,
}

impl Retrieve for VectorRetriever<'_> {
    fn retrieve<'a>(
        &'a self,
        question: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RetrievedNode>, RagError>> + Send + 'a>> {
        Box::pin(async move {
            trace!("VectorRetriever::retrieve top_k={}", self.top_k);
            let qv = self.embedder.embed(question).await?;
            if qv.len() != self.dim {
                return Err(RagError::VectorSizeMismatch {
                    got: qv.len(),
                    want: self.dim,
                });
            }
            let hits = self.store.search(qv, self.top_k).await?;
            trace!("VectorRetriever::retrieve hits={}", hits.len());
            Ok(hits)
        })
    }
}
