//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding away the verbose builder pattern and keeping the rest of the
//! crate decoupled from `qdrant-client`.

use std::collections::{BTreeMap, HashMap};

use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, vectors_config,
};
use qdrant_client::{Payload, Qdrant};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::record::{Node, RetrievedNode, sort_hits};

/// A facade over the Qdrant client bound to one collection.
pub struct QdrantFacade {
    pub(crate) client: Qdrant,
    pub(crate) collection: String,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Building the client does not contact the server.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Store(format!("client build: {e}")))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Vector size of the collection, or `None` when it does not exist.
    pub async fn collection_dim(&self) -> Result<Option<usize>, RagError> {
        let exists = self
            .client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| RagError::Store(format!("collection_exists: {e}")))?;
        if !exists {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(self.collection.as_str())
            .await
            .map_err(|e| RagError::Store(format!("collection_info: {e}")))?;

        let dim = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|c| match c {
                vectors_config::Config::Params(p) => Some(p.size as usize),
                vectors_config::Config::ParamsMap(_) => None,
            })
            .ok_or_else(|| {
                RagError::Store(format!(
                    "collection '{}' has no single unnamed vector space",
                    self.collection
                ))
            })?;

        Ok(Some(dim))
    }

    /// Ensures that the collection exists with vectors of size `dim`.
    ///
    /// - Exists with the same size → no-op.
    /// - Exists with another size → [`RagError::VectorSizeMismatch`].
    /// - Missing → created with cosine distance.
    pub async fn ensure_collection(&self, dim: usize) -> Result<(), RagError> {
        info!(
            "Ensuring collection '{}' with size={} distance=Cosine",
            self.collection, dim
        );

        if let Some(existing) = self.collection_dim().await? {
            if existing != dim {
                return Err(RagError::VectorSizeMismatch {
                    got: dim,
                    want: existing,
                });
            }
            debug!("Collection '{}' already exists", self.collection);
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| RagError::Store(format!("create_collection: {e}")))?;

        info!("Collection '{}' created successfully", self.collection);
        Ok(())
    }

    /// Drops the collection if present.
    pub async fn drop_collection(&self) -> Result<(), RagError> {
        if self.collection_dim().await?.is_none() {
            debug!("Collection '{}' absent, nothing to drop", self.collection);
            return Ok(());
        }
        self.client
            .delete_collection(self.collection.as_str())
            .await
            .map_err(|e| RagError::Store(format!("delete_collection: {e}")))?;
        warn!("Collection '{}' dropped", self.collection);
        Ok(())
    }

    /// Upserts (inserts or updates) a batch of nodes.
    ///
    /// Returns the number of points sent.
    pub async fn upsert_nodes(&self, batch: Vec<(Node, Vec<f32>)>) -> Result<usize, RagError> {
        if batch.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let mut points = Vec::with_capacity(batch.len());
        for (node, vector) in batch {
            let payload: Payload = json!({
                "text": node.text,
                "doc_id": node.doc_id,
                "chunk": node.chunk,
                "seq": node.seq,
                "metadata": node.metadata,
            })
            .try_into()
            .map_err(|e| RagError::Store(format!("payload convert: {e}")))?;
            points.push(PointStruct::new(node.id, vector, payload));
        }

        let n = points.len();
        info!("Upserting {} points into collection '{}'", n, self.collection);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Store(format!("upsert_points: {e}")))?;

        Ok(n)
    }

    /// Performs a similarity search and maps hits into [`RetrievedNode`]s.
    pub async fn search(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<RetrievedNode>, RagError> {
        debug!("Searching in '{}' with top_k={}", self.collection, top_k);

        let res = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, top_k as u64).with_payload(true),
            )
            .await
            .map_err(|e| RagError::Store(format!("search_points: {e}")))?;

        let mut out = Vec::with_capacity(res.result.len());
        for p in res.result {
            let payload: PointPayload = serde_json::from_value(qpayload_to_json(p.payload))?;
            out.push(RetrievedNode {
                content: payload.text,
                score: p.score,
                doc_id: payload.doc_id,
                seq: payload.seq,
                metadata: payload.metadata,
            });
        }
        sort_hits(&mut out);

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }

    /// Exact number of points in the collection.
    pub async fn count(&self) -> Result<usize, RagError> {
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| RagError::Store(format!("count: {e}")))?;
        Ok(res.result.map(|r| r.count as usize).unwrap_or(0))
    }
}

#[derive(Debug, Deserialize)]
struct PointPayload {
    #[serde(default)]
    text: String,
    #[serde(default)]
    doc_id: String,
    #[serde(default)]
    seq: u64,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
fn qpayload_to_json(p: HashMap<String, QValue>) -> serde_json::Value {
    serde_json::Value::Object(p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect())
}

fn qvalue_to_json(v: QValue) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    match v.kind {
        Some(K::StringValue(s)) => serde_json::Value::String(s),
        Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(K::DoubleValue(f)) => json!(f),
        Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(K::StructValue(s)) => qpayload_to_json(s.fields),
        Some(K::ListValue(l)) => {
            serde_json::Value::Array(l.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(K::NullValue(_)) | None => serde_json::Value::Null,
    }
}
