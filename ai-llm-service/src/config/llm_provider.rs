use std::{fmt, str::FromStr};

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for model inference.
///
/// The same enum selects both the chat backend and the embedding backend;
/// the two selections are independent.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// let p: LlmProvider = "huggingface".parse().unwrap();
/// assert_eq!(p, LlmProvider::Ollama);
/// assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime (on-host models).
    Ollama,
    /// OpenAI REST API (hosted models).
    OpenAI,
}

impl LlmProvider {
    /// Stable lowercase identifier, used in logs and index manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAI => "openai",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    /// Accepts `openai`/`hosted` for the hosted API and `ollama`/`local`/`huggingface`
    /// for a model served on the local host.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "chatgpt" | "hosted" => Ok(LlmProvider::OpenAI),
            "ollama" | "local" | "huggingface" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
