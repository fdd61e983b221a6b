//! HTTP handlers for the comparison API

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    http::{HeaderMap, HeaderValue},
    Json,
};
use serde::Serialize;
use shared_types::{AnalysisResult, AnalyzeRequest, UploadResponse};
use tracing::info;

use crate::analysis;
use crate::error::ApiError;
use crate::state::AppState;
use crate::upstream::UploadFile;
use crate::validation::{parse_role, validate_file};

/// Set on analyze responses that carry the fallback result
pub const FALLBACK_HEADER: &str = "x-analysis-fallback";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "compare-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/upload
///
/// Multipart fields: `file` (binary) and `type` (`referenceNda` | `customerNda`).
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut file: Option<UploadFile> = None;
    let mut role: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Failed to read file: {}", e)))?;
                file = Some(UploadFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Failed to read type: {}", e)))?;
                role = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::InvalidRequest("No file provided".to_string()))?;
    let document_type = parse_role(role.as_deref()).map_err(ApiError::InvalidRequest)?;
    validate_file(&file.file_name, file.content_type.as_deref(), file.bytes.len())
        .map_err(ApiError::InvalidRequest)?;

    let file_name = file.file_name.clone();
    let file_size = file.bytes.len() as u64;

    info!(
        file_name = %file_name,
        size = file_size,
        document_type = %document_type,
        "Parsing uploaded document"
    );

    let parsed = state.parser.parse(file).await?;

    info!(
        file_name = %file_name,
        pages = parsed.pages,
        elements = parsed.elements.len(),
        "Document parsed"
    );

    Ok(Json(UploadResponse::parsed(
        file_name,
        file_size,
        document_type,
        parsed,
    )))
}

/// Handler: POST /api/analyze
///
/// Always 200 once the inputs validate; a degraded result carries an
/// `error` field and the fallback header.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<AnalysisResult>), ApiError> {
    let Json(req) = body?;

    if req.reference_text.trim().is_empty() || req.customer_text.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "Both referenceText and customerText are required".to_string(),
        ));
    }

    info!(
        reference_len = req.reference_text.len(),
        customer_len = req.customer_text.len(),
        model = %state.model,
        "Analyzing NDA pair"
    );

    let result = analysis::analyze(state.chat.as_ref(), &state.model, &req).await;

    let mut headers = HeaderMap::new();
    if result.is_degraded() {
        headers.insert(FALLBACK_HEADER, HeaderValue::from_static("true"));
    }

    Ok((headers, Json(result)))
}
