//! Core data models used by the library.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk of a document, ready to be embedded and stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Deterministic id, see [`point_id`].
    pub id: String,
    pub doc_id: String,
    /// Ordinal of this chunk inside its document.
    pub chunk: usize,
    /// Insertion sequence; breaks score ties on retrieval.
    pub seq: u64,
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A passage returned by similarity search.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievedNode {
    pub content: String,
    pub score: f32,
    pub doc_id: String,
    pub seq: u64,
    pub metadata: BTreeMap<String, String>,
}

/// Final answer of a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResult {
    pub answer: String,
    /// `true` when the model produced the answer, `false` for fallbacks.
    pub synthesized: bool,
}

/// Deterministic UUIDv5 for chunk `chunk` of document `doc_id`.
///
/// Re-ingesting the same document yields the same ids, so stores overwrite
/// instead of duplicating.
pub fn point_id(doc_id: &str, chunk: usize) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{doc_id}#{chunk}").as_bytes())
}

/// Orders hits by descending score, then by insertion order.
pub fn sort_hits(hits: &mut [RetrievedNode]) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.seq.cmp(&b.seq)));
}
