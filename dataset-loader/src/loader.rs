//! Source-agnostic entry point: fetch rows, then build documents.

use std::{path::PathBuf, time::Duration};

use tracing::{info, instrument};

use crate::{
    config::{DatasetConfig, DatasetSource},
    documents::{Document, Record, build_documents},
    errors::DatasetError,
    hub::HubClient,
    jsonl,
};

/// Loads dataset rows from the configured source.
#[derive(Debug, Clone)]
pub enum DatasetLoader {
    Hub {
        client: HubClient,
        dataset: String,
        config: Option<String>,
        split: String,
    },
    Jsonl {
        path: PathBuf,
        dataset: String,
    },
}

impl DatasetLoader {
    /// Builds a loader from a validated config.
    pub fn from_config(cfg: &DatasetConfig) -> Result<Self, DatasetError> {
        cfg.validate()?;
        match cfg.source {
            DatasetSource::Hub => Ok(Self::Hub {
                client: HubClient::new(
                    &cfg.hub_url,
                    cfg.hf_token.as_deref(),
                    Duration::from_secs(cfg.timeout_secs),
                )?,
                dataset: cfg.name.clone(),
                config: cfg.config.clone(),
                split: cfg.split.clone(),
            }),
            DatasetSource::Jsonl => {
                let path = cfg.path.clone().ok_or_else(|| {
                    DatasetError::InvalidConfig("DATASET_PATH is required".into())
                })?;
                Ok(Self::jsonl(path, cfg.name.clone()))
            }
        }
    }

    /// Reads [`DatasetConfig::from_env`] and builds the matching loader.
    pub fn from_env() -> Result<Self, DatasetError> {
        Self::from_config(&DatasetConfig::from_env()?)
    }

    /// Loader over a local JSONL file.
    pub fn jsonl(path: impl Into<PathBuf>, dataset: impl Into<String>) -> Self {
        Self::Jsonl {
            path: path.into(),
            dataset: dataset.into(),
        }
    }

    /// Dataset id used as the `doc_id` prefix.
    pub fn dataset_name(&self) -> &str {
        match self {
            Self::Hub { dataset, .. } | Self::Jsonl { dataset, .. } => dataset,
        }
    }

    /// Fetches at most `max_samples` raw rows (`None` = whole split).
    pub async fn fetch_records(&self, max_samples: Option<usize>) -> Result<Vec<Record>, DatasetError> {
        match self {
            Self::Hub {
                client,
                dataset,
                config,
                split,
            } => {
                let config = match config {
                    Some(c) => c.clone(),
                    None => client.resolve_config(dataset, split).await?,
                };
                client.fetch_rows(dataset, &config, split, max_samples).await
            }
            Self::Jsonl { path, .. } => jsonl::read_records(path, max_samples),
        }
    }

    /// Fetches rows and turns them into documents (curated set included).
    ///
    /// Any failure aborts the whole call; no partial document list is returned.
    #[instrument(skip(self), fields(dataset = %self.dataset_name()))]
    pub async fn load_documents(&self, max_samples: Option<usize>) -> Result<Vec<Document>, DatasetError> {
        let records = self.fetch_records(max_samples).await?;
        info!(rows = records.len(), "dataset loaded");
        build_documents(&records, self.dataset_name())
    }
}
