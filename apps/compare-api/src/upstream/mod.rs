//! Clients for the two third-party services the API delegates to
//!
//! Both sit behind async traits so the handlers can be driven by in-memory
//! fakes in tests.

use async_trait::async_trait;
use shared_types::ParsedContent;
use thiserror::Error;

pub mod chat;
pub mod document_parse;

pub use chat::{ChatCompletion, ChatMessage, ChatRequest, ChatResponse, ResponseFormat, UpstageChat};
pub use document_parse::{DocumentParseResponse, UpstageDocumentParser};

/// Failure talking to an upstream service
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// A file handed to the document-digitization service
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Turns an uploaded file into normalized text, HTML and structure
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, file: UploadFile) -> Result<ParsedContent, UpstreamError>;
}

/// Pull a readable message out of an upstream error body.
///
/// Handles `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ..}`; anything else is returned as-is.
pub(crate) fn upstream_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    value["error"]["message"]
        .as_str()
        .or_else(|| value["error"].as_str())
        .or_else(|| value["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_error_message() {
        let body = r#"{"error":{"message":"Invalid API key","code":"unauthorized"}}"#;
        assert_eq!(upstream_message(body), "Invalid API key");
    }

    #[test]
    fn extracts_flat_messages() {
        assert_eq!(upstream_message(r#"{"error":"quota"}"#), "quota");
        assert_eq!(upstream_message(r#"{"message":"bad file"}"#), "bad file");
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(upstream_message("  gateway timeout \n"), "gateway timeout");
    }
}
