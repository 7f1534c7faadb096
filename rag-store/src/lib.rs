//! Vector index for the medical Q&A service.
//!
//! This crate provides:
//! - Chunking and parallel embedding of [`dataset_loader::Document`]s
//! - Storage in a local JSON snapshot or a Qdrant collection
//! - Top-k retrieval, answer synthesis and the raw-passage fallback
//!
//! [`VectorIndex`] is the entry point for application code.

pub mod chat;
pub mod chunker;
pub mod config;
pub mod embed;
pub mod embed_pool;
pub mod engine;
pub mod errors;
pub mod index;
pub mod manifest;
pub mod prompt;
pub mod record;
pub mod resolve;
pub mod retrieve;
pub mod store;

pub use chat::{ChatModel, LlmChat};
pub use config::{BackendKind, COLLECTION, RagConfig, SIMILARITY_TOP_K};
pub use embed::{EmbeddingFingerprint, EmbeddingsProvider, llm::LlmEmbedder};
pub use engine::{EMPTY_RESPONSE, EngineResponse, QueryEngine};
pub use errors::RagError;
pub use index::VectorIndex;
pub use manifest::IndexManifest;
pub use record::{Node, QueryResult, RetrievedNode};
pub use resolve::{APOLOGY, PREAMBLE, resolve};
pub use retrieve::{Retrieve, VectorRetriever};
