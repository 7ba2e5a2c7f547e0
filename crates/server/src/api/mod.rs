//! HTTP endpoint modules.
//!
//! Each sub-module owns one route group. Shared response types live here.

mod batch;
mod convert;
pub mod doc;
mod health;
mod metadata;


use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// `Json` extractor whose rejections are 400s in the `{error}` shape.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let error = rejection.body_text();
                tracing::warn!("Rejected request body: {}", error);
                Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))
            }
        }
    }
}

/// Body of the single-file endpoints.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub file_url: String,
    pub file_type: String,
    pub ai_model: Option<String>,
    pub api_key: Option<String>,
}

// ── Re-exports ───────────────────────────────────────────────────

pub use batch::batch_convert;
pub use convert::convert;
pub use health::{health, limits};
pub use metadata::metadata;
