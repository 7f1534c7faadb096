//! Vector store backends behind one enum.
//!
//! - [`local::LocalStore`]: JSON snapshot in the persistence directory.
//! - [`qdrant::QdrantFacade`]: remote Qdrant collection.

pub mod local;
pub mod qdrant;

use tracing::trace;

use crate::{
    config::{BackendKind, RagConfig},
    errors::RagError,
    record::{Node, RetrievedNode},
};

use local::LocalStore;
use qdrant::QdrantFacade;

/// Storage for the single collection of an index.
pub enum VectorStore {
    Local(LocalStore),
    Qdrant(QdrantFacade),
}

/// An existing collection found by [`VectorStore::open`], not yet adopted.
pub enum Opened {
    Local(LocalStore),
    Qdrant { dim: usize },
}

impl Opened {
    pub fn dim(&self) -> Option<usize> {
        match self {
            Opened::Local(s) => s.dim(),
            Opened::Qdrant { dim } => Some(*dim),
        }
    }
}

impl VectorStore {
    /// Builds the configured backend. Nothing is read or written yet.
    pub fn from_config(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;
        match cfg.backend {
            BackendKind::Local => Ok(Self::Local(LocalStore::new(&cfg.persist_dir, &cfg.collection))),
            BackendKind::Qdrant => Ok(Self::Qdrant(QdrantFacade::new(cfg)?)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Local(_) => BackendKind::Local,
            Self::Qdrant(_) => BackendKind::Qdrant,
        }
    }

    /// Looks for the persisted collection without touching in-memory state.
    pub async fn open(&self) -> Result<Option<Opened>, RagError> {
        match self {
            Self::Local(s) => Ok(s.reopen()?.map(Opened::Local)),
            Self::Qdrant(q) => Ok(q.collection_dim().await?.map(|dim| Opened::Qdrant { dim })),
        }
    }

    /// Makes an opened collection the active one.
    pub fn adopt(&mut self, opened: Opened) {
        if let (Self::Local(cur), Opened::Local(fresh)) = (&mut *self, opened) {
            *cur = fresh;
        }
    }

    pub async fn ensure_collection(&mut self, dim: usize) -> Result<(), RagError> {
        trace!("VectorStore::ensure_collection dim={dim}");
        match self {
            Self::Local(s) => s.ensure_dim(dim),
            Self::Qdrant(q) => q.ensure_collection(dim).await,
        }
    }

    pub async fn upsert(&mut self, batch: Vec<(Node, Vec<f32>)>) -> Result<usize, RagError> {
        match self {
            Self::Local(s) => s.upsert(batch),
            Self::Qdrant(q) => q.upsert_nodes(batch).await,
        }
    }

    /// Persists pending writes (local snapshot); Qdrant writes are already durable.
    pub async fn flush(&mut self) -> Result<(), RagError> {
        match self {
            Self::Local(s) => s.flush(),
            Self::Qdrant(_) => Ok(()),
        }
    }

    pub async fn search(&self, vector: Vec<f32>, k: usize) -> Result<Vec<RetrievedNode>, RagError> {
        match self {
            Self::Local(s) => s.search(&vector, k),
            Self::Qdrant(q) => q.search(vector, k).await,
        }
    }

    pub async fn count(&self) -> Result<usize, RagError> {
        match self {
            Self::Local(s) => Ok(s.len()),
            Self::Qdrant(q) => q.count().await,
        }
    }

    pub async fn drop_collection(&mut self) -> Result<(), RagError> {
        match self {
            Self::Local(s) => s.drop_collection(),
            Self::Qdrant(q) => q.drop_collection().await,
        }
    }
}
