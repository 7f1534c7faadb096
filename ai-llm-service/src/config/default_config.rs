//! Default LLM configs loaded from environment variables.
//!
//! Two roles are configured independently:
//!
//! - **Chat** → answer synthesis (`LLM_PROVIDER`, default `openai`)
//! - **Embedding** → vector generation (`EMBEDDING_PROVIDER`, default `openai`)
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_MAX_TOKENS`   = max tokens for chat (default 512)
//! - `LLM_TIMEOUT_SECS` = per-request timeout for chat (default 60)
//!
//! OpenAI:
//! - `OPENAI_API_KEY`    = credential (checked when a client is first used)
//! - `OPENAI_BASE_URL`   = endpoint (default `https://api.openai.com`)
//! - `OPENAI_CHAT_MODEL` = chat model (default `gpt-3.5-turbo`)
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (default `http://localhost:11434`)
//! - `OLLAMA_MODEL`                = chat model (default `qwen3:14b`)
//!
//! Embeddings:
//! - `EMBEDDING_MODEL` = model name (default depends on provider)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_u32, env_opt_u64, validate_http_endpoint,
    },
};

const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com";
const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";
const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OLLAMA_CHAT_MODEL: &str = "qwen3:14b";
const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "bge-m3";

/// Resolves the Ollama endpoint from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
/// - [`ConfigError::InvalidFormat`] if `OLLAMA_URL` has no http scheme
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        let _ = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(DEFAULT_OLLAMA_BASE.to_string())
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = env_opt("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string());
    validate_http_endpoint("OPENAI_BASE_URL", &url)?;
    Ok(url)
}

/// Reads a provider selector, falling back to `default` when unset.
fn provider_from_env(var: &'static str, default: LlmProvider) -> Result<LlmProvider, AiLlmError> {
    match env_opt(var) {
        Some(v) => Ok(v.parse::<LlmProvider>()?),
        None => Ok(default),
    }
}

/// Returns the OpenAI credential if configured.
///
/// A missing key is not an error here: it only fails once an OpenAI-backed
/// profile is actually invoked.
pub fn openai_api_key() -> Option<String> {
    env_opt("OPENAI_API_KEY")
}

/// Constructs the **chat** profile used for answer synthesis.
///
/// # Defaults
/// - `temperature = Some(0.1)`
/// - `max_tokens = Some(512)`
/// - `timeout_secs = Some(60)`
pub fn config_chat() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("LLM_PROVIDER", LlmProvider::OpenAI)?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.or(Some(512));
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.or(Some(60));

    let (model, endpoint, api_key) = match provider {
        LlmProvider::OpenAI => (
            env_opt("OPENAI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_CHAT_MODEL.into()),
            openai_endpoint()?,
            openai_api_key(),
        ),
        LlmProvider::Ollama => (
            env_opt("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_CHAT_MODEL.into()),
            ollama_endpoint()?,
            None,
        ),
    };

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(0.1),
        top_p: None,
        timeout_secs,
    })
}

/// Constructs the **embedding** profile.
///
/// The same profile must be used at index-build time and at query time;
/// the vector index records it in its manifest.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("EMBEDDING_PROVIDER", LlmProvider::OpenAI)?;

    let (default_model, endpoint, api_key) = match provider {
        LlmProvider::OpenAI => (
            DEFAULT_OPENAI_EMBEDDING_MODEL,
            openai_endpoint()?,
            openai_api_key(),
        ),
        LlmProvider::Ollama => (DEFAULT_OLLAMA_EMBEDDING_MODEL, ollama_endpoint()?, None),
    };

    Ok(LlmModelConfig {
        provider,
        model: env_opt("EMBEDDING_MODEL").unwrap_or_else(|| default_model.into()),
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}
