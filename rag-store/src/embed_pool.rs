//! Embedding executor with concurrency, progress and dimension checks.

use std::io::{self, IsTerminal};

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, info};

use crate::{embed::EmbeddingsProvider, errors::RagError, record::Node};

/// Embeds every node and returns vectors in node order.
///
/// # Arguments
/// - `nodes`: nodes to embed.
/// - `provider`: embedding backend.
/// - `concurrency`: maximum number of in-flight embedding calls.
///
/// # Errors
/// Returns the first provider error, or [`RagError::VectorSizeMismatch`] if
/// the provider returns vectors of different lengths.
pub async fn embed_nodes(
    nodes: &[Node],
    provider: &dyn EmbeddingsProvider,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    info!(
        "embed_pool::embed_nodes: total={} concurrency={}",
        nodes.len(),
        concurrency
    );
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let pb = progress_bar(nodes.len() as u64);

    let texts: Vec<String> = nodes.iter().map(|n| n.text.clone()).collect();

    let mut results: Vec<(usize, Vec<f32>)> = stream::iter(texts.into_iter().enumerate())
        .map(|(i, text)| {
            let pb = &pb;
            async move {
                let v = provider.embed(&text).await?;
                pb.inc(1);
                Ok::<(usize, Vec<f32>), RagError>((i, v))
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    pb.finish_and_clear();
    results.sort_by_key(|(i, _)| *i);

    let want = results[0].1.len();
    let mut out = Vec::with_capacity(results.len());
    for (_, v) in results {
        if v.len() != want {
            return Err(RagError::VectorSizeMismatch { got: v.len(), want });
        }
        out.push(v);
    }

    debug!("embed_pool::embed_nodes: {} vectors of dim {}", out.len(), want);
    Ok(out)
}

/// Progress bar on stderr; hidden when stderr is not a terminal.
fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if !io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} embedding ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-");
    pb.set_style(style);
    pb
}
