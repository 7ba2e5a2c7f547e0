use std::sync::Arc;

use cadbom_core::Config;
use cadbom_llm::providers::create_provider;
use cadbom_llm::BomAnalyzer;
use tracing::warn;

pub struct AppState {
    pub config: Arc<Config>,
    /// Shared by downloads and LLM calls; per-call timeouts are set on each request.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cadbom/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// An analyzer for this request, or `None` when no API key is available.
    pub fn analyzer(&self, api_key: Option<&str>, model: Option<&str>) -> Option<BomAnalyzer> {
        let ai = &self.config.ai;
        let key = ai.resolve_api_key(api_key)?;
        let provider = match create_provider(self.http.clone(), ai, Some(key)) {
            Ok(provider) => provider,
            Err(e) => {
                warn!("AI provider unavailable: {}", e);
                return None;
            }
        };
        Some(BomAnalyzer::new(
            provider,
            ai.resolve_model(model),
            self.config.timeouts.ai(),
            self.config.timeouts.bom(),
        ))
    }
}
