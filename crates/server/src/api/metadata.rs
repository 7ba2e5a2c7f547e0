//! Header metadata without geometry conversion.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use cadbom_core::{CadError, StepMetadata};
use cadbom_llm::FileSummary;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::pipeline;
use crate::scratch::ScratchSpace;
use crate::state::AppState;

use super::{ApiError, ApiJson, ConversionRequest, ErrorResponse};

#[derive(Serialize, utoipa::ToSchema)]
pub struct MetadataResponse {
    pub success: bool,
    pub metadata: StepMetadata,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub ai_analysis: Option<Value>,
}

#[utoipa::path(
    post,
    path = "/api/metadata",
    tag = "Conversion",
    request_body = ConversionRequest,
    responses(
        (status = 200, description = "Header metadata", body = MetadataResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 413, description = "File exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Download failed", body = ErrorResponse)
    )
)]
pub async fn metadata(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ConversionRequest>,
) -> Result<Json<MetadataResponse>, ApiError> {
    info!(file_url = %req.file_url, file_type = %req.file_type, "Metadata request");
    run(&state, req)
        .await
        .map(Json)
        .map_err(|e| pipeline::error_response(e, "Metadata extraction failed"))
}

async fn run(state: &AppState, req: ConversionRequest) -> Result<MetadataResponse, CadError> {
    let mut scratch = ScratchSpace::new(&state.config.scratch.dir);
    let (input, _) = pipeline::fetch(state, &mut scratch, &req.file_url, &req.file_type).await?;
    let inspection = pipeline::inspect(input).await;
    drop(scratch);

    let filename = pipeline::filename_from_url(&req.file_url);

    let ai_analysis = match state.analyzer(req.api_key.as_deref(), req.ai_model.as_deref()) {
        Some(analyzer) => {
            let summary = FileSummary {
                filename: filename.clone(),
                file_type: req.file_type.clone(),
                metadata: Some(inspection.metadata.clone()),
                dimensions: None,
                step_content: inspection.header,
            };
            Some(analyzer.analyze_file(&summary).await)
        }
        None => None,
    };

    Ok(MetadataResponse {
        success: true,
        metadata: inspection.metadata,
        filename,
        ai_analysis,
    })
}
