//! Readiness and capability endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

// ── Health ────────────────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether STEP solids can be imported by this build.
    pub cad_libraries: bool,
    #[serde(rename = "maxFileSizeMB")]
    pub max_file_size_mb: u64,
    pub authors: String,
    pub repository: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;
    Json(HealthResponse {
        status: "ok",
        cad_libraries: cadbom_geometry::kernel_available(),
        max_file_size_mb: config.limits.max_file_size_mb,
        authors: config.attribution.authors.clone(),
        repository: config.attribution.repository_url(),
    })
}

// ── Limits ────────────────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct LimitsResponse {
    #[serde(rename = "maxFileSizeMB")]
    pub max_file_size_mb: u64,
    #[serde(rename = "supportedFormats")]
    pub supported_formats: Vec<String>,
    #[serde(rename = "supportedAIModels")]
    pub supported_ai_models: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/limits",
    tag = "Health",
    responses(
        (status = 200, description = "Size cap, formats and AI models", body = LimitsResponse)
    )
)]
pub async fn limits(State(state): State<Arc<AppState>>) -> Json<LimitsResponse> {
    let config = &state.config;
    Json(LimitsResponse {
        max_file_size_mb: config.limits.max_file_size_mb,
        supported_formats: config.limits.supported_formats.clone(),
        supported_ai_models: config.ai.supported_models.clone(),
    })
}
