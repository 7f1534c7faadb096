//! Configuration layer: reads dataset source settings from environment variables.

use std::{path::PathBuf, str::FromStr};

use crate::errors::DatasetError;

pub const DEFAULT_DATASET: &str = "lavita/ChatDoctor-HealthCareMagic-100k";
pub const DEFAULT_SPLIT: &str = "train";
pub const DEFAULT_HUB_URL: &str = "https://datasets-server.huggingface.co";

/// Where dataset rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSource {
    /// Hugging Face datasets-server REST API.
    Hub,
    /// Local JSON-lines file.
    Jsonl,
}

impl FromStr for DatasetSource {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hub" | "huggingface" | "hf" => Ok(DatasetSource::Hub),
            "jsonl" | "file" => Ok(DatasetSource::Jsonl),
            other => Err(DatasetError::EnvParse {
                key: "DATASET_SOURCE".into(),
                value: other.into(),
            }),
        }
    }
}

/// Dataset settings.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub source: DatasetSource,
    /// Dataset id; also the prefix of every generated `doc_id`.
    pub name: String,
    pub split: String,
    /// Hub config name; resolved through `/splits` when `None`.
    pub config: Option<String>,
    /// JSONL file for the `jsonl` source.
    pub path: Option<PathBuf>,
    pub hub_url: String,
    pub hf_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source: DatasetSource::Hub,
            name: DEFAULT_DATASET.to_string(),
            split: DEFAULT_SPLIT.to_string(),
            config: None,
            path: None,
            hub_url: DEFAULT_HUB_URL.to_string(),
            hf_token: None,
            timeout_secs: 60,
        }
    }
}

impl DatasetConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `DATASET_SOURCE` (`hub` | `jsonl`, default: `hub`)
    /// - `DATASET_NAME` (default: `lavita/ChatDoctor-HealthCareMagic-100k`;
    ///   for `jsonl` the file stem when unset)
    /// - `DATASET_SPLIT` (default: `train`)
    /// - `DATASET_CONFIG` (optional)
    /// - `DATASET_PATH` (required for `jsonl`)
    /// - `HF_DATASETS_SERVER_URL` (default: `https://datasets-server.huggingface.co`)
    /// - `HF_TOKEN` (optional)
    /// - `DATASET_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, DatasetError> {
        let source = match read_env("DATASET_SOURCE") {
            Some(v) => v.parse()?,
            None => DatasetSource::Hub,
        };
        let path = read_env("DATASET_PATH").map(PathBuf::from);

        let name = read_env("DATASET_NAME")
            .or_else(|| match source {
                DatasetSource::Jsonl => path
                    .as_ref()
                    .and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().into_owned()),
                DatasetSource::Hub => None,
            })
            .unwrap_or_else(|| DEFAULT_DATASET.to_string());

        let cfg = Self {
            source,
            name,
            split: read_env("DATASET_SPLIT").unwrap_or_else(|| DEFAULT_SPLIT.to_string()),
            config: read_env("DATASET_CONFIG"),
            path,
            hub_url: read_env("HF_DATASETS_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_HUB_URL.to_string()),
            hf_token: read_env("HF_TOKEN"),
            timeout_secs: read_u64_env("DATASET_TIMEOUT_SECS")?.unwrap_or(60),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.name.trim().is_empty() {
            return Err(DatasetError::InvalidConfig("DATASET_NAME is empty".into()));
        }
        match self.source {
            DatasetSource::Jsonl if self.path.is_none() => Err(DatasetError::InvalidConfig(
                "DATASET_PATH is required when DATASET_SOURCE=jsonl".into(),
            )),
            DatasetSource::Hub
                if !(self.hub_url.starts_with("http://") || self.hub_url.starts_with("https://")) =>
            {
                Err(DatasetError::InvalidConfig(
                    "HF_DATASETS_SERVER_URL must start with http:// or https://".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Non-empty, trimmed env value.
fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read an optional `u64` from env.
fn read_u64_env(key: &str) -> Result<Option<u64>, DatasetError> {
    match read_env(key) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| DatasetError::EnvParse {
            key: key.into(),
            value: v,
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_aliases() {
        assert_eq!("HUB".parse::<DatasetSource>().unwrap(), DatasetSource::Hub);
        assert_eq!("jsonl".parse::<DatasetSource>().unwrap(), DatasetSource::Jsonl);
        assert!("parquet".parse::<DatasetSource>().is_err());
    }

    #[test]
    fn jsonl_requires_path() {
        let cfg = DatasetConfig {
            source: DatasetSource::Jsonl,
            ..DatasetConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn hub_url_needs_scheme() {
        let cfg = DatasetConfig {
            hub_url: "datasets-server.huggingface.co".into(),
            ..DatasetConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(DatasetConfig::default().validate().is_ok());
    }
}
