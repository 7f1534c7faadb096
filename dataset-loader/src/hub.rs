//! Minimal client for the Hugging Face datasets-server REST API.
//!
//! - `GET {base}/splits?dataset=`: config discovery
//! - `GET {base}/rows?dataset=&config=&split=&offset=&length=`: paged rows (≤ 100 per page)

use std::time::Duration;

use reqwest::header;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, info};

use crate::{documents::Record, errors::DatasetError};

/// Server-side cap on `length` for `/rows`.
pub const MAX_PAGE_ROWS: usize = 100;

/// Thin async client for datasets-server.
#[derive(Debug, Clone)]
pub struct HubClient {
    client: reqwest::Client,
    base: String,
}

impl HubClient {
    /// Creates a client for `base_url`, sending `token` as a bearer credential when set.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, DatasetError> {
        let mut headers = header::HeaderMap::new();
        if let Some(t) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {t}"))
                .map_err(|e| DatasetError::InvalidConfig(format!("HF_TOKEN: {e}")))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Finds the config name that carries `split` (first config if none matches).
    pub async fn resolve_config(&self, dataset: &str, split: &str) -> Result<String, DatasetError> {
        let resp: SplitsResponse = self
            .get_json("splits", &[("dataset", dataset.to_string())])
            .await?;
        pick_config(&resp.splits, split).ok_or_else(|| {
            DatasetError::Parse(format!("dataset '{dataset}' exposes no splits"))
        })
    }

    /// Reads rows in order until `limit` rows are collected or the split ends.
    pub async fn fetch_rows(
        &self,
        dataset: &str,
        config: &str,
        split: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, DatasetError> {
        let mut out: Vec<Record> = Vec::new();

        loop {
            let length = page_len(limit, out.len());
            if length == 0 {
                break;
            }

            let offset = out.len();
            let page: RowsResponse = self
                .get_json(
                    "rows",
                    &[
                        ("dataset", dataset.to_string()),
                        ("config", config.to_string()),
                        ("split", split.to_string()),
                        ("offset", offset.to_string()),
                        ("length", length.to_string()),
                    ],
                )
                .await?;

            let got = page.rows.len();
            for (i, entry) in page.rows.into_iter().enumerate() {
                match entry.row {
                    Value::Object(map) => out.push(map),
                    _ => {
                        return Err(DatasetError::Parse(format!(
                            "row {} is not a JSON object",
                            offset + i
                        )));
                    }
                }
            }
            debug!(dataset, offset, got, "fetched rows page");

            let exhausted = got < length || page.num_rows_total.is_some_and(|t| out.len() >= t);
            if got == 0 || exhausted {
                break;
            }
        }

        info!(dataset, config, split, rows = out.len(), "dataset rows fetched");
        Ok(out)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DatasetError> {
        let url = format!("{}/{}", self.base, path);
        debug!("GET {}", url);

        let resp = self.client.get(&url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DatasetError::HttpStatus {
                status,
                url,
                snippet: snippet(&body),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| DatasetError::Parse(format!("{path} response: {e}")))
    }
}

/// Rows to request next: a full page, or what is left under `limit`.
fn page_len(limit: Option<usize>, fetched: usize) -> usize {
    match limit {
        Some(n) => n.saturating_sub(fetched).min(MAX_PAGE_ROWS),
        None => MAX_PAGE_ROWS,
    }
}

fn pick_config(splits: &[SplitEntry], split: &str) -> Option<String> {
    splits
        .iter()
        .find(|s| s.split == split)
        .or_else(|| splits.first())
        .map(|s| s.config.clone())
}

fn snippet(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(240).collect()
}

#[derive(Debug, Deserialize)]
struct SplitsResponse {
    splits: Vec<SplitEntry>,
}

#[derive(Debug, Deserialize)]
struct SplitEntry {
    config: String,
    split: String,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    #[serde(default)]
    num_rows_total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_len_respects_limit_and_cap() {
        assert_eq!(page_len(Some(1000), 0), 100);
        assert_eq!(page_len(Some(250), 200), 50);
        assert_eq!(page_len(Some(10), 10), 0);
        assert_eq!(page_len(None, 12_345), 100);
    }

    #[test]
    fn picks_config_for_split() {
        let raw = r#"{"splits":[
            {"dataset":"d","config":"default","split":"test"},
            {"dataset":"d","config":"main","split":"train"}
        ]}"#;
        let resp: SplitsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(pick_config(&resp.splits, "train").as_deref(), Some("main"));
        assert_eq!(pick_config(&resp.splits, "validation").as_deref(), Some("default"));
        assert_eq!(pick_config(&[], "train"), None);
    }

    #[test]
    fn rows_page_keeps_row_key_order() {
        let raw = r#"{"features":[],"rows":[
            {"row_idx":0,"row":{"instruction":"i","input":"q","output":"a"},"truncated_cells":[]}
        ],"num_rows_total":1}"#;
        let page: RowsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(page.num_rows_total, Some(1));
        let Value::Object(row) = &page.rows[0].row else {
            panic!("row should be an object");
        };
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, ["instruction", "input", "output"]);
    }

    #[test]
    fn trims_trailing_slash_from_base() {
        let c = HubClient::new("https://datasets-server.huggingface.co/", None, Duration::from_secs(5))
            .unwrap();
        assert_eq!(c.base, "https://datasets-server.huggingface.co");
    }
}
