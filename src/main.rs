use std::error::Error;

use ai_llm_service::config::default_config::openai_api_key;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    ai_llm_service::telemetry::init("info");

    if openai_api_key().is_none() {
        warn!("OPENAI_API_KEY not found in environment variables");
    }

    api::start().await?;

    Ok(())
}
