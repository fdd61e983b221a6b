//! Error types for the comparison API

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

/// Error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingApiKey => {
                ApiError::Configuration("API key is not configured".to_string())
            }
            UpstreamError::Status { status, message } => ApiError::Upstream {
                status: Some(status),
                message,
            },
            other => ApiError::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error, details, upstream_status) = match self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg, None, None)
            }
            ApiError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "Server is not configured for document processing".to_string(),
                    Some(msg),
                    None,
                )
            }
            ApiError::Upstream { status, message } => {
                tracing::error!("Upstream error ({:?}): {}", status, message);
                let details = match status {
                    Some(code) => format!("Upstream API error {}: {}", code, message),
                    None => message,
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "Failed to parse document".to_string(),
                    Some(details),
                    status,
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error,
            code,
            details,
            upstream_status,
        };

        (status, Json(body)).into_response()
    }
}
