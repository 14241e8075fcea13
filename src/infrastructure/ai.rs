use crate::config::AppConfig;
use crate::services::describer::GeminiDescriber;
use crate::services::gemini::{GeminiClient, GeminiConfig};
use crate::services::pipeline::RoastPipeline;
use crate::services::roaster::GeminiRoaster;
use crate::services::staging::StagingStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the provider client once and wires describer and roaster around it.
pub fn setup_pipeline(config: &AppConfig, staging: StagingStore) -> anyhow::Result<Arc<RoastPipeline>> {
    if config.gemini_api_key.is_empty() {
        warn!("⚠️  API_KEY is not set. Every roast request will fail until it is configured.");
    }

    let client = Arc::new(GeminiClient::new(GeminiConfig::from(config))?);
    info!(
        "🤖 AI provider: {} (model {}, timeout {}s, retries {})",
        config.gemini_base_url,
        client.model(),
        config.ai_timeout_secs,
        config.ai_max_retries
    );

    let describer = Arc::new(GeminiDescriber::new(client.clone(), staging.clone()));
    let roaster = Arc::new(GeminiRoaster::new(client, config.support_link.clone()));

    Ok(Arc::new(RoastPipeline::new(staging, describer, roaster)))
}
