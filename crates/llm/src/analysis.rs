use std::time::Duration;

use cadbom_core::{Dimensions, StepMetadata};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::prompts;
use crate::provider::{LlmProvider, Message};

/// What the analyzer knows about one processed file.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub filename: String,
    pub file_type: String,
    pub metadata: Option<StepMetadata>,
    pub dimensions: Option<Dimensions>,
    /// Raw header text, truncated before it reaches the prompt.
    #[serde(skip)]
    pub step_content: Option<String>,
}

impl FileSummary {
    pub(crate) fn metadata_json(&self) -> Value {
        self.metadata
            .as_ref()
            .and_then(|m| serde_json::to_value(m).ok())
            .unwrap_or_else(|| json!({}))
    }

    pub(crate) fn dimensions_json(&self) -> Value {
        self.dimensions
            .as_ref()
            .and_then(|d| serde_json::to_value(d).ok())
            .unwrap_or_else(|| json!({}))
    }
}

/// Turns file summaries into part and BOM records via an LLM.
///
/// Every call is best-effort: failures come back as `{"error": ...}`
/// objects rather than `Err`, so callers can embed them in a response.
pub struct BomAnalyzer {
    provider: Box<dyn LlmProvider>,
    model: String,
    analysis_timeout: Duration,
    bom_timeout: Duration,
}

impl BomAnalyzer {
    pub fn new(
        provider: Box<dyn LlmProvider>,
        model: String,
        analysis_timeout: Duration,
        bom_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            model,
            analysis_timeout,
            bom_timeout,
        }
    }

    /// Structured part data for a single file.
    pub async fn analyze_file(&self, file: &FileSummary) -> Value {
        info!(filename = %file.filename, model = %self.model, "Requesting AI part analysis");
        let prompt = prompts::part_prompt(file);

        match self
            .provider
            .complete(&self.model, vec![Message::user(prompt)], self.analysis_timeout)
            .await
        {
            Ok(reply) => parse_reply(&reply),
            Err(e) => {
                warn!(filename = %file.filename, "AI analysis failed: {}", e);
                json!({ "error": format!("AI analysis failed: {e}") })
            }
        }
    }

    /// One consolidated BOM across `files`.
    pub async fn generate_bom(&self, files: &[FileSummary]) -> Value {
        info!(files = files.len(), model = %self.model, "Requesting AI BOM generation");
        let prompt = prompts::bom_prompt(files);

        match self
            .provider
            .complete(&self.model, vec![Message::user(prompt)], self.bom_timeout)
            .await
        {
            Ok(reply) => parse_reply(&reply),
            Err(e) => {
                warn!("BOM generation failed: {}", e);
                json!({ "error": format!("BOM generation failed: {e}") })
            }
        }
    }
}

/// Parse a model reply as JSON, keeping the raw text when it isn't.
fn parse_reply(reply: &str) -> Value {
    debug!("LLM response: {}", reply);
    match serde_json::from_str(strip_code_fence(reply)) {
        Ok(value) => value,
        Err(e) => {
            warn!("AI response was not valid JSON: {}", e);
            json!({
                "error": "AI response was not valid JSON",
                "raw_response": reply,
            })
        }
    }
}

/// Remove a surrounding markdown code fence and its `json` tag.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let inner = rest.split("```").next().unwrap_or_default();
            inner.strip_prefix("json").unwrap_or(inner).trim()
        }
        None => trimmed,
    }
}
