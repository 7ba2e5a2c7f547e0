pub mod openrouter;

use cadbom_core::config::AiConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the OpenRouter provider for a resolved API key.
pub fn create_provider(
    client: reqwest::Client,
    ai_config: &AiConfig,
    api_key: Option<String>,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    let api_key = api_key.ok_or_else(|| LlmError::NotConfigured("No API key provided".into()))?;
    Ok(Box::new(openrouter::OpenRouterProvider::new(
        client,
        api_key,
        ai_config.openrouter_base_url.clone(),
        ai_config.site_url.clone(),
        ai_config.app_title.clone(),
    )))
}
