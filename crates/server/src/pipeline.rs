//! Per-file processing shared by the single-file and batch endpoints.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::Json;
use cadbom_core::config::LimitsConfig;
use cadbom_core::{CadError, Dimensions, FileFormat, StepMetadata};
use cadbom_extract::PROMPT_HEADER_CHARS;
use cadbom_geometry::{compute_dimensions, export_gltf, import_model, write_stl};
use serde_json::Value;
use tracing::debug;

use crate::api::ErrorResponse;
use crate::download::Downloader;
use crate::scratch::{extension_for, ScratchSpace};
use crate::state::AppState;

/// A file's sniffed header metadata and the raw text kept for prompts.
pub struct Inspection {
    pub metadata: StepMetadata,
    pub header: Option<String>,
}

/// Output of the geometry stage.
pub struct Conversion {
    pub dimensions: Dimensions,
    pub gltf: Value,
}

/// Parse a declared type and make sure this deployment converts it.
pub fn supported_format(limits: &LimitsConfig, declared: &str) -> Result<FileFormat, CadError> {
    let format = FileFormat::parse(declared)?;
    if !limits.accepts(format) {
        return Err(CadError::UnsupportedFormat(declared.to_string()));
    }
    Ok(format)
}

/// Download `url` into a new scratch file named after the declared type.
pub async fn fetch(
    state: &AppState,
    scratch: &mut ScratchSpace,
    url: &str,
    declared_type: &str,
) -> Result<(PathBuf, u64), CadError> {
    let dest = scratch.allocate(&extension_for(declared_type));
    let config = &state.config;
    let bytes = Downloader::new(&state.http, &config.limits, &config.timeouts)
        .download(url, &dest)
        .await?;
    Ok((dest, bytes))
}

/// Sniff header metadata off the async runtime. Never fails.
pub async fn inspect(path: PathBuf) -> Inspection {
    let result = tokio::task::spawn_blocking(move || Inspection {
        metadata: cadbom_extract::extract_step_metadata(&path),
        header: cadbom_extract::header_text(&path, PROMPT_HEADER_CHARS),
    })
    .await;

    result.unwrap_or_else(|e| {
        tracing::warn!("Metadata task failed: {}", e);
        Inspection {
            metadata: StepMetadata::default(),
            header: None,
        }
    })
}

/// Import, measure and export `input` as glTF.
///
/// STEP solids are tessellated and written to an intermediate STL first; the
/// measured mesh and the exported scene both come from that STL.
pub async fn convert(
    scratch: &mut ScratchSpace,
    input: PathBuf,
    format: FileFormat,
) -> Result<Conversion, CadError> {
    let stl_path = format.is_step().then(|| scratch.allocate("stl"));
    let gltf_path = scratch.allocate("gltf");

    let task = tokio::task::spawn_blocking(move || -> Result<Conversion, CadError> {
        let mut mesh = import_model(&input, format)?;
        if let Some(stl_path) = stl_path {
            write_stl(&mesh, &stl_path)?;
            mesh = import_model(&stl_path, FileFormat::Stl)?;
        }
        let dimensions = compute_dimensions(&mesh)?;
        let gltf = export_gltf(&mesh, &gltf_path)?;
        debug!(
            length = dimensions.length,
            width = dimensions.width,
            height = dimensions.height,
            "Converted to glTF"
        );
        Ok(Conversion { dimensions, gltf })
    });

    task.await
        .map_err(|e| CadError::Conversion(format!("conversion task failed: {e}")))?
}

/// Name to echo back: the last path segment of the URL, query stripped.
pub fn filename_from_url(file_url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(file_url) {
        if let Some(last) = parsed.path_segments().and_then(|mut s| s.next_back()) {
            return last.to_string();
        }
    }
    let without_query = file_url.split(['?', '#']).next().unwrap_or_default();
    without_query.rsplit('/').next().unwrap_or_default().to_string()
}

/// Map a pipeline failure onto an HTTP status and message.
///
/// Client errors keep their own message; everything else is prefixed with
/// the endpoint's failure context.
pub fn error_response(err: CadError, context: &str) -> (StatusCode, Json<ErrorResponse>) {
    let (status, error) = match &err {
        CadError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()),
        _ if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, format!("{context}: {err}")),
    };
    tracing::warn!(status = status.as_u16(), "{}", error);
    (status, Json(ErrorResponse { error }))
}
