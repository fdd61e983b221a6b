//! Wire and data model shared by the comparison API and its clients
//!
//! Field names follow the JSON contract of the upload and analyze
//! endpoints (camelCase on the wire, snake_case in Rust).

pub mod analysis;
pub mod document;

pub use analysis::{AnalysisResult, AnalyzeRequest, Risk, SectionComparison, Severity, Summary};
pub use document::{
    Coordinate, DocumentRole, Element, ElementContent, ParsedContent, UploadResponse,
    UploadedDocument,
};

/// Error returned when parsing one of the string-tagged enums fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
