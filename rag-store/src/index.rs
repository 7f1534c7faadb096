//! Vector index over medical documents: build, reopen, query and wipe.

use std::sync::Arc;

use dataset_loader::Document;
use tracing::{debug, info, trace, warn};

use crate::{
    chat::ChatModel,
    chunker::nodes_from_documents,
    config::{BackendKind, RagConfig},
    embed::{EmbeddingFingerprint, EmbeddingsProvider},
    embed_pool::embed_nodes,
    engine::QueryEngine,
    errors::RagError,
    manifest::IndexManifest,
    record::QueryResult,
    resolve::resolve,
    retrieve::VectorRetriever,
    store::VectorStore,
};

/// One collection plus the models used to fill and query it.
///
/// The index is *loaded* once it holds a manifest, either from
/// [`create_index`](Self::create_index) or [`load_index`](Self::load_index).
pub struct VectorIndex {
    cfg: RagConfig,
    store: VectorStore,
    embedder: Arc<dyn EmbeddingsProvider>,
    chat: Arc<dyn ChatModel>,
    manifest: Option<IndexManifest>,
}

impl VectorIndex {
    /// Creates an unloaded index. Does not touch disk or network.
    pub fn new(
        cfg: RagConfig,
        embedder: Arc<dyn EmbeddingsProvider>,
        chat: Arc<dyn ChatModel>,
    ) -> Result<Self, RagError> {
        trace!("VectorIndex::new collection={} backend={}", cfg.collection, cfg.backend.as_str());
        let store = VectorStore::from_config(&cfg)?;
        Ok(Self {
            cfg,
            store,
            embedder,
            chat,
            manifest: None,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.manifest.is_some()
    }

    pub fn manifest(&self) -> Option<&IndexManifest> {
        self.manifest.as_ref()
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Embeds and stores `docs`, returning how many documents were indexed.
    ///
    /// Documents accumulate in an existing collection built with the same
    /// embedding model and dimension; any other collection is dropped and
    /// recreated.
    ///
    /// # Errors
    /// [`RagError::EmptyInput`] for no documents, [`RagError::Upstream`] when
    /// embedding fails, store/IO errors otherwise.
    pub async fn create_index(&mut self, docs: &[Document]) -> Result<usize, RagError> {
        if docs.is_empty() {
            return Err(RagError::EmptyInput);
        }

        let mut nodes = nodes_from_documents(docs, self.cfg.chunk_max_chars, 0);
        info!("Indexing {} documents as {} nodes", docs.len(), nodes.len());

        let vectors = embed_nodes(&nodes, self.embedder.as_ref(), self.cfg.embedding_concurrency).await?;
        let dim = vectors.first().map(Vec::len).ok_or(RagError::EmptyInput)?;

        let fp = self.embedder.fingerprint();
        let mut manifest = match self.reusable_collection(&fp, dim).await? {
            Some(m) => m,
            None => IndexManifest::new(&self.cfg.collection, self.store.kind(), &fp, dim),
        };

        let start = manifest.next_seq;
        for (i, n) in nodes.iter_mut().enumerate() {
            n.seq = start + i as u64;
        }
        let node_total = nodes.len();

        self.store.ensure_collection(dim).await?;
        let mut pairs = nodes.into_iter().zip(vectors);
        loop {
            let batch: Vec<_> = pairs.by_ref().take(self.cfg.upsert_batch).collect();
            if batch.is_empty() {
                break;
            }
            self.store.upsert(batch).await?;
        }
        self.store.flush().await?;

        manifest.document_count += docs.len();
        manifest.node_count = self.store.count().await?;
        manifest.next_seq = start + node_total as u64;
        manifest.touch();
        manifest.save(&self.cfg.persist_dir)?;

        info!(
            "Index '{}' ready: {} nodes, dim={}",
            manifest.collection, manifest.node_count, manifest.dim
        );
        self.manifest = Some(manifest);
        Ok(docs.len())
    }

    /// Reopens the persisted collection. Failures are logged and reported as `false`;
    /// the in-memory state is left unchanged in that case.
    pub async fn load_index(&mut self) -> bool {
        match self.try_load().await {
            Ok(m) => {
                info!(
                    "Loaded index '{}' ({} nodes, {}/{})",
                    m.collection, m.node_count, m.embedding_provider, m.embedding_model
                );
                self.manifest = Some(m);
                true
            }
            Err(e) => {
                warn!(error = %e, "Could not load existing index");
                false
            }
        }
    }

    /// Answers `question` from the index, falling back to raw passages.
    ///
    /// # Errors
    /// [`RagError::NotReady`] when no index is loaded.
    pub async fn query(&self, question: &str) -> Result<QueryResult, RagError> {
        let manifest = self.manifest.as_ref().ok_or(RagError::NotReady)?;

        let retriever = VectorRetriever {
            store: &self.store,
            embedder: self.embedder.as_ref(),
            top_k: self.cfg.top_k,
            dim: manifest.dim,
        };
        let engine = QueryEngine {
            retriever: &retriever,
            chat: self.chat.as_ref(),
        };

        let response = engine.query(question).await?;
        debug!("Engine returned {} source nodes", response.source_nodes.len());
        resolve(question, response, &retriever).await
    }

    /// Drops the collection and its manifest. The index is unloaded afterwards.
    pub async fn reset(&mut self) -> Result<(), RagError> {
        self.manifest = None;
        self.store.drop_collection().await?;
        IndexManifest::remove(&self.cfg.persist_dir, &self.cfg.collection)?;
        info!("Index '{}' reset", self.cfg.collection);
        Ok(())
    }

    async fn try_load(&mut self) -> Result<IndexManifest, RagError> {
        let fp = self.embedder.fingerprint();
        let manifest = IndexManifest::load(&self.cfg.persist_dir, &self.cfg.collection)?
            .ok_or_else(|| RagError::Store(format!("no manifest for '{}'", self.cfg.collection)))?;
        manifest.check_compatible(self.store.kind(), &fp)?;

        let opened = self
            .store
            .open()
            .await?
            .ok_or_else(|| RagError::Store(format!("collection '{}' not found", self.cfg.collection)))?;
        if opened.dim() != Some(manifest.dim) {
            return Err(RagError::VectorSizeMismatch {
                got: opened.dim().unwrap_or(0),
                want: manifest.dim,
            });
        }

        self.store.adopt(opened);
        Ok(manifest)
    }

    /// Adopts the persisted collection when it matches `fp`/`dim`; otherwise
    /// drops it and its manifest and returns `None`.
    ///
    /// The loaded manifest is cleared only once the store is about to change.
    async fn reusable_collection(
        &mut self,
        fp: &EmbeddingFingerprint,
        dim: usize,
    ) -> Result<Option<IndexManifest>, RagError> {
        let found = match IndexManifest::load(&self.cfg.persist_dir, &self.cfg.collection) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable manifest");
                None
            }
        };
        let opened = match self.store.open().await {
            Ok(o) => o,
            // Qdrant open errors mean the server is unreachable; keep its data.
            Err(e) if self.store.kind() == BackendKind::Qdrant => return Err(e),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable snapshot");
                None
            }
        };

        match (found, opened) {
            (Some(m), Some(o))
                if m.check_compatible(self.store.kind(), fp).is_ok()
                    && m.dim == dim
                    && o.dim() == Some(dim) =>
            {
                debug!("Appending to existing collection '{}'", m.collection);
                self.manifest = None;
                self.store.adopt(o);
                return Ok(Some(m));
            }
            (None, None) => {}
            _ => warn!(
                "Existing collection '{}' does not match {}/{} dim={}, recreating",
                self.cfg.collection, fp.provider, fp.model, dim
            ),
        }

        self.manifest = None;
        self.store.drop_collection().await?;
        IndexManifest::remove(&self.cfg.persist_dir, &self.cfg.collection)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        future::Future,
        path::Path,
        pin::Pin,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use std::time::Duration;

    use ai_llm_service::AiLlmError;

    use super::*;
    use crate::config::COLLECTION;
    use crate::resolve::{APOLOGY, PREAMBLE};

    const KEYWORDS: [&str; 4] = ["fever", "cough", "sleep", "water"];

    /// Keyword-count vectors: texts sharing words with the query rank higher.
    struct KeywordEmbedder {
        model: &'static str,
    }

    impl EmbeddingsProvider for KeywordEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
            Box::pin(async move {
                if text.contains("poison") {
                    return Err(RagError::Upstream(AiLlmError::Timeout(Duration::from_secs(60))));
                }
                let lower = text.to_lowercase();
                let mut v: Vec<f32> = KEYWORDS.iter().map(|k| lower.matches(k).count() as f32).collect();
                v.push(0.1);
                Ok(v)
            })
        }

        fn fingerprint(&self) -> EmbeddingFingerprint {
            EmbeddingFingerprint {
                provider: "test".into(),
                model: self.model.into(),
            }
        }
    }

    struct ScriptedChat {
        reply: String,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl ScriptedChat {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }
    }

    impl ChatModel for ScriptedChat {
        fn complete<'a>(
            &'a self,
            prompt: &'a str,
            _system: Option<&'a str>,
        ) -> Pin<Box<dyn Future<Output = Result<String, RagError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Box::pin(async move { Ok(self.reply.clone()) })
        }
    }

    fn doc(id: &str, text: &str) -> Document {
        let mut metadata = BTreeMap::new();
        metadata.insert("doc_id".to_string(), id.to_string());
        metadata.insert("source".to_string(), "test".to_string());
        Document {
            text: text.to_string(),
            metadata,
        }
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc("t_0", "A fever is a raised body temperature. Treat fever with rest."),
            doc("t_1", "A dry cough may follow a cold."),
            doc("t_2", "Adults need seven to nine hours of sleep."),
        ]
    }

    fn index(dir: &Path, model: &'static str, chat: Arc<ScriptedChat>) -> VectorIndex {
        VectorIndex::new(
            RagConfig::new_default(dir),
            Arc::new(KeywordEmbedder { model }),
            chat,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn query_before_initialize_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let idx = index(dir.path(), "kw", ScriptedChat::new("x"));
        assert!(!idx.is_loaded());
        assert!(matches!(idx.query("fever?").await, Err(RagError::NotReady)));
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut idx = index(dir.path(), "kw", ScriptedChat::new("x"));
        assert!(matches!(idx.create_index(&[]).await, Err(RagError::EmptyInput)));
        assert!(!idx.is_loaded());
    }

    #[tokio::test]
    async fn failed_embedding_keeps_previous_index_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut idx = index(dir.path(), "kw", ScriptedChat::new("ok"));
        idx.create_index(&corpus()).await.unwrap();

        let err = idx.create_index(&[doc("t_9", "poison ivy rash")]).await.unwrap_err();
        assert!(matches!(err, RagError::Upstream(_)));
        assert!(idx.is_loaded());
        assert_eq!(idx.manifest().unwrap().node_count, 3);
        assert_eq!(idx.query("fever").await.unwrap().answer, "ok");
    }

    #[tokio::test]
    async fn unreachable_qdrant_keeps_previous_index_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RagConfig {
            backend: BackendKind::Qdrant,
            qdrant_url: "http://127.0.0.1:9".to_string(),
            ..RagConfig::new_default(dir.path())
        };
        let mut idx = VectorIndex::new(
            cfg,
            Arc::new(KeywordEmbedder { model: "kw" }),
            ScriptedChat::new("ok"),
        )
        .unwrap();
        let loaded = IndexManifest::new(COLLECTION, BackendKind::Qdrant, &idx.embedder.fingerprint(), 5);
        idx.manifest = Some(loaded.clone());

        assert!(idx.create_index(&corpus()).await.is_err());
        assert_eq!(idx.manifest(), Some(&loaded));
    }

    #[tokio::test]
    async fn synthesized_answer_uses_best_passage() {
        let dir = tempfile::tempdir().unwrap();
        let chat = ScriptedChat::new("  Rest and drink fluids.  ");
        let mut idx = index(dir.path(), "kw", chat.clone());

        assert_eq!(idx.create_index(&corpus()).await.unwrap(), 3);
        assert!(idx.is_loaded());
        assert_eq!(idx.manifest().unwrap().node_count, 3);

        let out = idx.query("What to do about a fever?").await.unwrap();
        assert_eq!(out.answer, "Rest and drink fluids.");
        assert!(out.synthesized);

        let prompt = chat.last_prompt.lock().unwrap().clone().unwrap();
        let fever = prompt.find("Treat fever").unwrap();
        let cough = prompt.find("dry cough").unwrap();
        assert!(fever < cough);
        assert!(prompt.ends_with("Query: What to do about a fever?\nAnswer: "));
    }

    #[tokio::test]
    async fn empty_synthesis_falls_back_to_passages() {
        let dir = tempfile::tempdir().unwrap();
        let mut idx = index(dir.path(), "kw", ScriptedChat::new(""));
        idx.create_index(&corpus()).await.unwrap();

        let out = idx.query("how much sleep").await.unwrap();
        assert!(!out.synthesized);
        let body = out.answer.strip_prefix(PREAMBLE).unwrap();
        assert!(body.starts_with("Adults need seven to nine hours of sleep."));
        assert_eq!(body.split("\n\n").count(), 3);
        assert_ne!(out.answer, APOLOGY);
    }

    #[tokio::test]
    async fn load_index_reopens_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut idx = index(dir.path(), "kw", ScriptedChat::new("ok"));
            idx.create_index(&corpus()).await.unwrap();
        }

        let mut idx = index(dir.path(), "kw", ScriptedChat::new("ok"));
        assert!(idx.load_index().await);
        let first = idx.manifest().cloned();
        assert!(idx.load_index().await);
        assert_eq!(idx.manifest().cloned(), first);
        assert_eq!(idx.query("cough").await.unwrap().answer, "ok");
    }

    #[tokio::test]
    async fn load_without_collection_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut idx = index(dir.path(), "kw", ScriptedChat::new("ok"));
        assert!(!idx.load_index().await);
        assert!(!idx.load_index().await);
        assert!(!idx.is_loaded());
    }

    #[tokio::test]
    async fn other_embedding_model_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut idx = index(dir.path(), "kw", ScriptedChat::new("ok"));
            idx.create_index(&corpus()).await.unwrap();
        }

        let mut other = index(dir.path(), "other", ScriptedChat::new("ok"));
        assert!(!other.load_index().await);
        assert!(!other.is_loaded());

        // Indexing with the new model rebuilds the collection from scratch.
        other.create_index(&corpus()[..1]).await.unwrap();
        let m = other.manifest().unwrap();
        assert_eq!(m.embedding_model, "other");
        assert_eq!(m.node_count, 1);
        assert_eq!(m.document_count, 1);
    }

    #[tokio::test]
    async fn documents_accumulate_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mut idx = index(dir.path(), "kw", ScriptedChat::new("ok"));
        let docs = corpus();
        idx.create_index(&docs[..2]).await.unwrap();
        idx.create_index(&docs[2..]).await.unwrap();

        let m = idx.manifest().unwrap();
        assert_eq!(m.node_count, 3);
        assert_eq!(m.document_count, 3);
        assert_eq!(m.next_seq, 3);
    }

    #[tokio::test]
    async fn reset_unloads_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let chat = ScriptedChat::new("ok");
        let mut idx = index(dir.path(), "kw", chat.clone());
        idx.create_index(&corpus()).await.unwrap();
        assert!(dir.path().join("medical_wikidoc.json").exists());

        idx.reset().await.unwrap();
        assert!(!idx.is_loaded());
        assert!(!dir.path().join("medical_wikidoc.json").exists());
        assert!(!dir.path().join("medical_wikidoc.manifest.json").exists());
        assert!(matches!(idx.query("fever").await, Err(RagError::NotReady)));
        assert!(!idx.load_index().await);
        idx.reset().await.unwrap();
    }
}
