//! Document-digitization client (PDF/DOC/DOCX → text, HTML, elements)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use shared_types::{Element, ElementContent, ParsedContent};
use tracing::debug;

use super::{upstream_message, DocumentParser, UploadFile, UpstreamError};

pub const DEFAULT_DOCUMENT_PARSE_URL: &str = "https://api.upstage.ai/v1/document-digitization";

/// Raw payload returned by the digitization service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentParseResponse {
    #[serde(default)]
    pub content: ElementContent,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub usage: Option<ParseUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseUsage {
    #[serde(default)]
    pub pages: Option<u32>,
}

impl DocumentParseResponse {
    /// Collapse the upstream payload into the shape the API returns.
    ///
    /// `text` falls back to `html` when the service produced no plain text.
    /// Page count prefers the billed page count, then the highest element
    /// page, then 1 for any non-empty document.
    pub fn into_parsed_content(self) -> ParsedContent {
        let ElementContent { html, text, .. } = self.content;
        let text = if text.trim().is_empty() {
            html.clone()
        } else {
            text
        };

        let pages = self
            .usage
            .and_then(|u| u.pages)
            .filter(|&p| p > 0)
            .or_else(|| self.elements.iter().map(|e| e.page).max().filter(|&p| p > 0))
            .unwrap_or(if text.is_empty() { 0 } else { 1 });

        ParsedContent {
            text,
            html,
            elements: self.elements,
            pages,
        }
    }
}

/// Upstage document-parse over HTTP
pub struct UpstageDocumentParser {
    client: Client,
    api_key: Option<String>,
    url: String,
}

impl UpstageDocumentParser {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            url: DEFAULT_DOCUMENT_PARSE_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn form(file: UploadFile) -> Result<Form, UpstreamError> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        Ok(Form::new()
            .part("document", part)
            .text("output_formats", r#"["html", "text"]"#)
            .text("base64_encoding", r#"["table"]"#)
            .text("ocr", "auto")
            .text("coordinates", "true")
            .text("model", "document-parse"))
    }
}

#[async_trait]
impl DocumentParser for UpstageDocumentParser {
    async fn parse(&self, file: UploadFile) -> Result<ParsedContent, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey)?;

        debug!(
            file_name = %file.file_name,
            size = file.bytes.len(),
            "Sending document to digitization service"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .multipart(Self::form(file)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        let parsed: DocumentParseResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        Ok(parsed.into_parsed_content())
    }
}
