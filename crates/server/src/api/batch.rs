//! Multi-file processing with optional BOM consolidation.
//!
//! Files are processed in order and each one fails on its own: a bad file
//! becomes a failure entry and the batch carries on.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use cadbom_core::{CadError, Dimensions, StepMetadata};
use cadbom_llm::{BomAnalyzer, FileSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::pipeline;
use crate::scratch::ScratchSpace;
use crate::state::AppState;

use super::{ApiJson, ErrorResponse};

// ── Request ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileToProcess {
    pub file_url: String,
    pub file_type: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchConversionRequest {
    pub files: Vec<FileToProcess>,
    pub ai_model: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "enabled")]
    pub extract_metadata: bool,
    #[serde(default = "enabled")]
    pub generate_preview: bool,
    #[serde(default, rename = "generateBOM")]
    pub generate_bom: bool,
}

fn enabled() -> bool {
    true
}

// ── Response ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProcessedFile {
    pub filename: String,
    pub file_type: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StepMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub gltf: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub ai_analysis: Option<Value>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FailedFile {
    pub filename: String,
    pub success: bool,
    pub error: String,
}

/// One file's outcome, in request order.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum FileResult {
    Processed(ProcessedFile),
    Failed(FailedFile),
}

impl FileResult {
    fn succeeded(&self) -> bool {
        matches!(self, FileResult::Processed(_))
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BatchResponse {
    pub success: bool,
    pub total_files: usize,
    pub processed: usize,
    pub failed: usize,
    pub files: Vec<FileResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub bom: Option<Value>,
}

// ── Handler ───────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/batch-convert",
    tag = "Conversion",
    request_body = BatchConversionRequest,
    responses(
        (status = 200, description = "Per-file results, with a BOM when requested", body = BatchResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    )
)]
pub async fn batch_convert(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<BatchConversionRequest>,
) -> Json<BatchResponse> {
    info!(
        files = req.files.len(),
        extract_metadata = req.extract_metadata,
        generate_preview = req.generate_preview,
        generate_bom = req.generate_bom,
        "Batch request"
    );

    let analyzer = state.analyzer(req.api_key.as_deref(), req.ai_model.as_deref());
    let mut files = Vec::with_capacity(req.files.len());
    let mut summaries = Vec::new();

    for file in &req.files {
        let filename = file
            .file_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| pipeline::filename_from_url(&file.file_url));

        match process_file(&state, &req, file, filename.clone(), analyzer.as_ref()).await {
            Ok((processed, summary)) => {
                if let Some(summary) = summary {
                    summaries.push(summary);
                }
                files.push(FileResult::Processed(processed));
            }
            Err(e) => {
                warn!(filename = %filename, "Batch file failed: {}", e);
                files.push(FileResult::Failed(FailedFile {
                    filename,
                    success: false,
                    error: e.to_string(),
                }));
            }
        }
    }

    let processed = files.iter().filter(|f| f.succeeded()).count();
    let failed = files.len() - processed;

    let bom = match &analyzer {
        Some(analyzer) if req.generate_bom && !summaries.is_empty() => {
            Some(analyzer.generate_bom(&summaries).await)
        }
        _ => None,
    };

    info!(processed, failed, bom = bom.is_some(), "Batch complete");
    Json(BatchResponse {
        success: true,
        total_files: req.files.len(),
        processed,
        failed,
        files,
        bom,
    })
}

/// Run one batch item. Scratch files are gone by the time this returns.
async fn process_file(
    state: &AppState,
    req: &BatchConversionRequest,
    file: &FileToProcess,
    filename: String,
    analyzer: Option<&BomAnalyzer>,
) -> Result<(ProcessedFile, Option<FileSummary>), CadError> {
    let format = if req.generate_preview {
        Some(pipeline::supported_format(&state.config.limits, &file.file_type)?)
    } else {
        None
    };

    let mut scratch = ScratchSpace::new(&state.config.scratch.dir);
    let (input, _) = pipeline::fetch(state, &mut scratch, &file.file_url, &file.file_type).await?;

    let inspection = if req.extract_metadata {
        Some(pipeline::inspect(input.clone()).await)
    } else {
        None
    };
    let conversion = match format {
        Some(format) => Some(pipeline::convert(&mut scratch, input, format).await?),
        None => None,
    };
    drop(scratch);

    let (metadata, header) = match inspection {
        Some(i) => (Some(i.metadata), i.header),
        None => (None, None),
    };
    let (dimensions, gltf) = match conversion {
        Some(c) => (Some(c.dimensions), Some(c.gltf)),
        None => (None, None),
    };

    let mut processed = ProcessedFile {
        filename: filename.clone(),
        file_type: file.file_type.clone(),
        success: true,
        metadata,
        dimensions,
        gltf,
        ai_analysis: None,
    };

    let summary = match analyzer {
        Some(analyzer) => {
            let summary = FileSummary {
                filename,
                file_type: file.file_type.clone(),
                metadata: processed.metadata.clone(),
                dimensions: processed.dimensions.clone(),
                step_content: header,
            };
            processed.ai_analysis = Some(analyzer.analyze_file(&summary).await);
            Some(summary)
        }
        None => None,
    };

    Ok((processed, summary))
}
