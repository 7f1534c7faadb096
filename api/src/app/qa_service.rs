//! Q&A service shared by all handlers: dataset loader plus the vector index.
//!
//! The index sits behind a `tokio::sync::RwLock`: queries share the read
//! lock, initialize and reset take the write lock.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use dataset_loader::DatasetLoader;
use rag_store::{LlmChat, LlmEmbedder, RagConfig, VectorIndex};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::error_handler::AppError;

pub struct QaService {
    index: RwLock<VectorIndex>,
    loader: DatasetLoader,
}

impl QaService {
    pub fn new(index: VectorIndex, loader: DatasetLoader) -> Self {
        Self {
            index: RwLock::new(index),
            loader,
        }
    }

    /// Wires model profiles, index and dataset loader from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let profiles =
            Arc::new(LlmServiceProfiles::from_env().map_err(|e| AppError::Config(e.to_string()))?);
        let cfg = RagConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;

        let index = VectorIndex::new(
            cfg,
            Arc::new(LlmEmbedder::new(profiles.clone())),
            Arc::new(LlmChat::new(profiles)),
        )
        .map_err(|e| AppError::Config(e.to_string()))?;
        let loader = DatasetLoader::from_env().map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self::new(index, loader))
    }

    /// Tries to reopen a persisted index; returns whether one is loaded now.
    pub async fn load_existing(&self) -> bool {
        let loaded = self.index.write().await.load_index().await;
        if loaded {
            info!("Vector store index loaded successfully");
        } else {
            info!("No existing index found. Use /initialize endpoint to create one.");
        }
        loaded
    }

    pub async fn is_loaded(&self) -> bool {
        self.index.read().await.is_loaded()
    }

    /// Loads up to `max_samples` dataset rows (plus curated notes) and indexes them.
    /// `0` means no cap.
    ///
    /// The dataset is fetched before the write lock is taken, so queries keep
    /// running against the previous index meanwhile.
    #[instrument(skip(self))]
    pub async fn initialize(&self, max_samples: usize) -> Result<usize, AppError> {
        let cap = (max_samples > 0).then_some(max_samples);
        let docs = self.loader.load_documents(cap).await?;
        let mut index = self.index.write().await;
        index
            .create_index(&docs)
            .await
            .map_err(|e| AppError::from_rag(e, "INGESTION_FAILED"))
    }

    pub async fn query(&self, question: &str) -> Result<String, AppError> {
        let index = self.index.read().await;
        let result = index
            .query(question)
            .await
            .map_err(|e| AppError::from_rag(e, "QUERY_FAILED"))?;
        Ok(result.answer)
    }

    pub async fn reset(&self) -> Result<(), AppError> {
        let mut index = self.index.write().await;
        index
            .reset()
            .await
            .map_err(|e| AppError::from_rag(e, "RESET_FAILED"))
    }
}
