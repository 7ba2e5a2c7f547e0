//! Single-file conversion to glTF.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use cadbom_core::{CadError, Dimensions, StepMetadata};
use cadbom_llm::FileSummary;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::pipeline;
use crate::scratch::ScratchSpace;
use crate::state::AppState;

use super::{ApiError, ApiJson, ConversionRequest, ErrorResponse};

#[derive(Serialize, utoipa::ToSchema)]
pub struct ConvertResponse {
    pub success: bool,
    /// glTF 2.0 scene document.
    #[schema(value_type = Object)]
    pub gltf: Value,
    pub metadata: StepMetadata,
    pub dimensions: Dimensions,
    pub filename: String,
    /// Bytes received from `fileUrl`.
    #[serde(rename = "fileSize")]
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub ai_analysis: Option<Value>,
}

#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "Conversion",
    request_body = ConversionRequest,
    responses(
        (status = 200, description = "Converted scene with metadata and dimensions", body = ConvertResponse),
        (status = 400, description = "Malformed body or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Download or conversion failed", body = ErrorResponse)
    )
)]
pub async fn convert(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ConversionRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    info!(file_url = %req.file_url, file_type = %req.file_type, "Convert request");
    run(&state, req)
        .await
        .map(Json)
        .map_err(|e| pipeline::error_response(e, "Conversion failed"))
}

async fn run(state: &AppState, req: ConversionRequest) -> Result<ConvertResponse, CadError> {
    let format = pipeline::supported_format(&state.config.limits, &req.file_type)?;

    let mut scratch = ScratchSpace::new(&state.config.scratch.dir);
    let (input, file_size) = pipeline::fetch(state, &mut scratch, &req.file_url, &req.file_type).await?;
    let inspection = pipeline::inspect(input.clone()).await;
    let conversion = pipeline::convert(&mut scratch, input, format).await?;
    drop(scratch);

    let filename = pipeline::filename_from_url(&req.file_url);

    let ai_analysis = match state.analyzer(req.api_key.as_deref(), req.ai_model.as_deref()) {
        Some(analyzer) => {
            let summary = FileSummary {
                filename: filename.clone(),
                file_type: req.file_type.clone(),
                metadata: Some(inspection.metadata.clone()),
                dimensions: Some(conversion.dimensions.clone()),
                step_content: inspection.header,
            };
            Some(analyzer.analyze_file(&summary).await)
        }
        None => None,
    };

    Ok(ConvertResponse {
        success: true,
        gltf: conversion.gltf,
        metadata: inspection.metadata,
        dimensions: conversion.dimensions,
        filename,
        file_size,
        ai_analysis,
    })
}
