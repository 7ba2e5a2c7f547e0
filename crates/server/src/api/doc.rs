//! OpenAPI documentation aggregator.
//!
//! Collects the `#[utoipa::path]`-annotated handlers and `ToSchema` types
//! into one document, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CAD Converter API",
        version = "0.1.0",
        description = "Convert CAD files to glTF, sniff STEP header metadata, and draft BOMs with an LLM.",
    ),
    tags(
        (name = "Health", description = "Service readiness and capabilities"),
        (name = "Conversion", description = "Single-file conversion, metadata extraction, and batch BOM generation"),
    ),
    paths(
        crate::api::health::health,
        crate::api::health::limits,
        crate::api::convert::convert,
        crate::api::metadata::metadata,
        crate::api::batch::batch_convert,
    )
)]
pub struct ApiDoc;
