//! Shared LLM service: chat generation and embeddings over Ollama or OpenAI.
//!
//! Construct one [`service_profiles::LlmServiceProfiles`] per process, wrap it
//! in `Arc` and hand clones to the components that need a model.

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
    pub mod llm_provider;
}

pub mod error_handler;
pub mod service_profiles;
pub mod telemetry;

pub mod services {
    pub mod ollama_service;
    pub mod open_ai_service;
}

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, ConfigError};
pub use service_profiles::LlmServiceProfiles;
