//! Uploaded documents and their parsed content

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseEnumError;

/// Which side of the comparison a document plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentRole {
    /// Baseline agreement used as the standard of comparison
    ReferenceNda,
    /// Counterpart agreement evaluated against the reference
    CustomerNda,
}

impl DocumentRole {
    pub const ALL: [DocumentRole; 2] = [DocumentRole::ReferenceNda, DocumentRole::CustomerNda];

    /// Wire tag used in the multipart `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::ReferenceNda => "referenceNda",
            DocumentRole::CustomerNda => "customerNda",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DocumentRole::ReferenceNda => "Reference NDA",
            DocumentRole::CustomerNda => "Customer NDA",
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "referenceNda" => Ok(DocumentRole::ReferenceNda),
            "customerNda" => Ok(DocumentRole::CustomerNda),
            other => Err(ParseEnumError {
                kind: "document type",
                value: other.to_string(),
            }),
        }
    }
}

/// A point of an element's bounding polygon, normalized to page size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// Renderings of one element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementContent {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub text: String,
}

/// One structural unit of a parsed document (heading, paragraph, table, ...)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: ElementContent,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub page: u32,
}

/// Normalized output of the document-digitization service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedContent {
    pub text: String,
    pub html: String,
    pub elements: Vec<Element>,
    pub pages: u32,
}

/// A successfully uploaded and parsed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub file_name: String,
    pub document_type: DocumentRole,
    pub parsed_content: ParsedContent,
}

impl UploadedDocument {
    /// Canonical text handed to the analyze endpoint
    pub fn text(&self) -> &str {
        &self.parsed_content.text
    }
}

/// Body of the upload endpoint's response, success and failure alike
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_content: Option<ParsedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl UploadResponse {
    /// Build the success payload for a parsed upload
    pub fn parsed(
        file_name: impl Into<String>,
        file_size: u64,
        document_type: DocumentRole,
        parsed_content: ParsedContent,
    ) -> Self {
        Self {
            success: true,
            message: Some("File uploaded and parsed successfully".to_string()),
            file_name: Some(file_name.into()),
            file_size: Some(file_size),
            document_type: Some(document_type),
            parsed_content: Some(parsed_content),
            error: None,
            details: None,
        }
    }

    /// Convert a successful response into the client-side document record.
    ///
    /// Returns `None` when the response is a failure or lacks any of the
    /// fields a document needs.
    pub fn into_document(self) -> Option<UploadedDocument> {
        if !self.success {
            return None;
        }
        Some(UploadedDocument {
            file_name: self.file_name?,
            document_type: self.document_type?,
            parsed_content: self.parsed_content?,
        })
    }
}
