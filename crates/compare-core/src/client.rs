//! Binding to the comparison API's upload and analyze endpoints

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use shared_types::{AnalysisResult, AnalyzeRequest, DocumentRole, UploadResponse, UploadedDocument};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a failure payload
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// A local file selected for upload
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).map(str::to_string);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Media type implied by a file name's extension
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

/// The two server operations the orchestrator drives
#[async_trait]
pub trait CompareApi: Send + Sync {
    async fn upload(&self, role: DocumentRole, file: FileUpload) -> Result<UploadedDocument, ClientError>;

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ClientError>;
}

/// [`CompareApi`] over HTTP
pub struct HttpCompareClient {
    client: Client,
    base_url: String,
}

impl HttpCompareClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CompareApi for HttpCompareClient {
    async fn upload(&self, role: DocumentRole, file: FileUpload) -> Result<UploadedDocument, ClientError> {
        debug!(role = %role, file_name = %file.file_name, "Uploading document");

        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().text("type", role.as_str()).part("file", part);

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if !body.success {
            return Err(ClientError::Rejected {
                status,
                message: body
                    .error
                    .or(body.message)
                    .unwrap_or_else(|| format!("Upload failed with status {}", status)),
            });
        }

        body.into_document().ok_or_else(|| {
            ClientError::InvalidResponse("upload response is missing parsed content".to_string())
        })
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ClientError> {
        let response = self
            .client
            .post(self.url("/api/analyze"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: body["error"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Analysis failed with status {}", status)),
            });
        }

        let result: AnalysisResult = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if let Some(reason) = &result.error {
            warn!("Server returned fallback analysis: {}", reason);
        }
        Ok(result)
    }
}
