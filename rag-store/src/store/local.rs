//! In-process vector store persisted as a single JSON snapshot.
//!
//! Vectors are L2-normalized on insert, so cosine similarity is a dot product.
//! The snapshot (`{collection}.json`) is replaced atomically on [`LocalStore::flush`].

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    errors::RagError,
    record::{Node, RetrievedNode, sort_hits},
};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(flatten)]
    node: Node,
    vector: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    format_version: u32,
    collection: String,
    dim: usize,
    entries: Vec<StoredEntry>,
}

/// Snapshot-backed store for one collection.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    collection: String,
    dim: Option<usize>,
    entries: Vec<StoredEntry>,
    by_id: HashMap<String, usize>,
}

impl LocalStore {
    /// Empty, unpersisted store for `collection` under `dir`.
    pub fn new(dir: &Path, collection: &str) -> Self {
        Self {
            path: snapshot_path(dir, collection),
            collection: collection.to_string(),
            dim: None,
            entries: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Reads the snapshot from disk; `Ok(None)` when there is none.
    ///
    /// # Errors
    /// [`RagError::Io`]/[`RagError::Parse`] on unreadable files, [`RagError::Store`]
    /// when the snapshot belongs to another collection or has ragged vectors.
    pub fn open(dir: &Path, collection: &str) -> Result<Option<Self>, RagError> {
        let path = snapshot_path(dir, collection);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let snap: Snapshot = serde_json::from_slice(&bytes)?;
        if snap.format_version != SNAPSHOT_VERSION {
            return Err(RagError::Store(format!(
                "unsupported snapshot version {}",
                snap.format_version
            )));
        }
        if snap.collection != collection {
            return Err(RagError::Store(format!(
                "snapshot holds collection '{}', expected '{}'",
                snap.collection, collection
            )));
        }
        if let Some(bad) = snap.entries.iter().find(|e| e.vector.len() != snap.dim) {
            return Err(RagError::VectorSizeMismatch {
                got: bad.vector.len(),
                want: snap.dim,
            });
        }

        let by_id = snap
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.node.id.clone(), i))
            .collect();

        info!(
            "Opened local snapshot {:?}: {} entries, dim={}",
            path,
            snap.entries.len(),
            snap.dim
        );

        Ok(Some(Self {
            path,
            collection: snap.collection,
            dim: Some(snap.dim),
            entries: snap.entries,
            by_id,
        }))
    }

    /// Reads this store's snapshot again, leaving `self` untouched.
    pub fn reopen(&self) -> Result<Option<Self>, RagError> {
        match self.path.parent() {
            Some(dir) => Self::open(dir, &self.collection),
            None => Ok(None),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.path
    }

    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fixes the vector dimension; an empty store accepts any.
    pub fn ensure_dim(&mut self, dim: usize) -> Result<(), RagError> {
        match self.dim {
            Some(want) if want != dim && !self.entries.is_empty() => {
                Err(RagError::VectorSizeMismatch { got: dim, want })
            }
            _ => {
                self.dim = Some(dim);
                Ok(())
            }
        }
    }

    /// Inserts or replaces entries by node id. Not persisted until [`flush`](Self::flush).
    pub fn upsert(&mut self, batch: Vec<(Node, Vec<f32>)>) -> Result<usize, RagError> {
        let want = match self.dim {
            Some(d) => d,
            None => return Err(RagError::Store("collection has no dimension yet".into())),
        };

        let n = batch.len();
        for (node, vector) in batch {
            if vector.len() != want {
                return Err(RagError::VectorSizeMismatch {
                    got: vector.len(),
                    want,
                });
            }
            let entry = StoredEntry {
                vector: normalize(vector),
                node,
            };
            match self.by_id.get(&entry.node.id) {
                Some(&i) => self.entries[i] = entry,
                None => {
                    self.by_id.insert(entry.node.id.clone(), self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
        debug!("Local upsert: {} entries (total={})", n, self.entries.len());
        Ok(n)
    }

    /// Writes the snapshot (tmp file + rename).
    pub fn flush(&self) -> Result<(), RagError> {
        let dim = self.dim.unwrap_or(0);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snap = SnapshotRef {
            format_version: SNAPSHOT_VERSION,
            collection: &self.collection,
            dim,
            entries: &self.entries,
        };
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&snap)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Local snapshot written to {:?}", self.path);
        Ok(())
    }

    /// Top-`k` entries by cosine similarity, ties broken by insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedNode>, RagError> {
        if let Some(want) = self.dim {
            if query.len() != want {
                return Err(RagError::VectorSizeMismatch {
                    got: query.len(),
                    want,
                });
            }
        }

        let q = normalize(query.to_vec());
        let mut hits: Vec<RetrievedNode> = self
            .entries
            .iter()
            .map(|e| RetrievedNode {
                content: e.node.text.clone(),
                score: dot(&q, &e.vector),
                doc_id: e.node.doc_id.clone(),
                seq: e.node.seq,
                metadata: e.node.metadata.clone(),
            })
            .collect();

        sort_hits(&mut hits);
        hits.truncate(k);
        Ok(hits)
    }

    /// Deletes the snapshot file and clears memory. Missing file is fine.
    pub fn drop_collection(&mut self) -> Result<(), RagError> {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Removed local snapshot {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.entries.clear();
        self.by_id.clear();
        self.dim = None;
        Ok(())
    }
}

/// Borrowed view for serialization without cloning entries.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    collection: &'a str,
    dim: usize,
    entries: &'a [StoredEntry],
}

fn snapshot_path(dir: &Path, collection: &str) -> PathBuf {
    dir.join(format!("{collection}.json"))
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
