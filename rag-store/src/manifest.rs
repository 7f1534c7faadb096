//! Index manifest: records which embedding space a collection was built in.
//!
//! Stored as `{collection}.manifest.json` next to the snapshot.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{config::BackendKind, embed::EmbeddingFingerprint, errors::RagError};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub collection: String,
    pub backend: String,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub dim: usize,
    pub distance: String,
    pub document_count: usize,
    pub node_count: usize,
    /// Sequence number for the next inserted node.
    pub next_seq: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl IndexManifest {
    pub fn new(
        collection: &str,
        backend: BackendKind,
        fingerprint: &EmbeddingFingerprint,
        dim: usize,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            format_version: MANIFEST_VERSION,
            collection: collection.to_string(),
            backend: backend.as_str().to_string(),
            embedding_provider: fingerprint.provider.clone(),
            embedding_model: fingerprint.model.clone(),
            dim,
            distance: "Cosine".to_string(),
            document_count: 0,
            node_count: 0,
            next_seq: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn path(dir: &Path, collection: &str) -> PathBuf {
        dir.join(format!("{collection}.manifest.json"))
    }

    /// Reads the manifest; `Ok(None)` when the file does not exist.
    pub fn load(dir: &Path, collection: &str) -> Result<Option<Self>, RagError> {
        let path = Self::path(dir, collection);
        if !path.exists() {
            return Ok(None);
        }
        let m: Self = serde_json::from_slice(&fs::read(&path)?)?;
        if m.format_version != MANIFEST_VERSION {
            return Err(RagError::Incompatible(format!(
                "unsupported manifest version {}",
                m.format_version
            )));
        }
        debug!("Loaded manifest {:?}", path);
        Ok(Some(m))
    }

    /// Writes the manifest atomically (tmp file + rename).
    pub fn save(&self, dir: &Path) -> Result<(), RagError> {
        fs::create_dir_all(dir)?;
        let path = Self::path(dir, &self.collection);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, &path)?;
        debug!("Manifest written to {:?}", path);
        Ok(())
    }

    /// Deletes the manifest. Missing file is fine.
    pub fn remove(dir: &Path, collection: &str) -> Result<(), RagError> {
        let path = Self::path(dir, collection);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed manifest {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks that vectors from `fingerprint` belong to this collection.
    pub fn check_compatible(
        &self,
        backend: BackendKind,
        fingerprint: &EmbeddingFingerprint,
    ) -> Result<(), RagError> {
        if self.backend != backend.as_str() {
            return Err(RagError::Incompatible(format!(
                "collection stored in backend '{}', configured '{}'",
                self.backend,
                backend.as_str()
            )));
        }
        if self.embedding_provider != fingerprint.provider || self.embedding_model != fingerprint.model {
            return Err(RagError::Incompatible(format!(
                "collection embedded with {}/{}, configured {}/{}",
                self.embedding_provider, self.embedding_model, fingerprint.provider, fingerprint.model
            )));
        }
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = now_rfc3339();
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
