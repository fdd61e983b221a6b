//! NDA comparison via the chat-completion service
//!
//! One request, one answer. Any failure on the way (missing key, HTTP
//! error, no choices, unparseable content) is replaced by the fixed
//! fallback result tagged with an `error` message.

use serde_json::json;
use shared_types::{AnalysisResult, AnalyzeRequest, Risk, SectionComparison, Severity, Summary};
use thiserror::Error;
use tracing::{info, warn};

use crate::upstream::{ChatCompletion, ChatMessage, ChatRequest, ResponseFormat, UpstreamError};

const SCHEMA_NAME: &str = "nda_analysis";

const SYSTEM_PROMPT: &str = "You are an experienced legal analyst specializing in \
non-disclosure agreements. You compare a customer's NDA against a reference NDA, \
identify clause-level differences, and assess the legal and business risk each \
difference introduces for the party using the reference template. Respond with a \
single JSON object that follows the provided schema. Do not include any text \
outside the JSON object.";

const TASK_INSTRUCTIONS: &str = "Tasks:
1. Identify the major sections of both agreements (for example: definition of \
confidential information, obligations of the receiving party, term and termination, \
return of materials, remedies, governing law). For each section give a similarity \
score from 0 to 100 and a short description of the differences.
2. List every risk the customer NDA introduces compared to the reference NDA. For \
each risk give the section, a severity of low, medium or high, a short title, a \
description and a concrete recommendation.
3. Summarize the overall risk as low, medium or high, list the key issues, and give \
an overall recommendation.";

/// Why a real analysis could not be produced
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("model returned no choices")]
    EmptyChoices,

    #[error("model returned invalid JSON: {0}")]
    InvalidContent(#[from] serde_json::Error),
}

/// JSON schema the model's answer must follow
pub fn response_schema() -> serde_json::Value {
    let severity = json!({ "type": "string", "enum": ["low", "medium", "high"] });

    json!({
        "type": "object",
        "properties": {
            "sections": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "match": { "type": "integer", "minimum": 0, "maximum": 100 },
                        "differences": { "type": "string" }
                    },
                    "required": ["title", "match", "differences"],
                    "additionalProperties": false
                }
            },
            "risks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "section": { "type": "string" },
                        "severity": severity,
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "recommendation": { "type": "string" }
                    },
                    "required": ["section", "severity", "title", "description", "recommendation"],
                    "additionalProperties": false
                }
            },
            "summary": {
                "type": "object",
                "properties": {
                    "overallRisk": severity,
                    "keyIssues": { "type": "array", "items": { "type": "string" } },
                    "recommendation": { "type": "string" }
                },
                "required": ["overallRisk", "keyIssues", "recommendation"],
                "additionalProperties": false
            }
        },
        "required": ["sections", "risks", "summary"],
        "additionalProperties": false
    })
}

/// System + user messages embedding both full texts
pub fn build_messages(reference_text: &str, customer_text: &str) -> Vec<ChatMessage> {
    let user = format!(
        "Compare the following two non-disclosure agreements.\n\n\
         === REFERENCE NDA ===\n{reference_text}\n=== END REFERENCE NDA ===\n\n\
         === CUSTOMER NDA ===\n{customer_text}\n=== END CUSTOMER NDA ===\n\n\
         {TASK_INSTRUCTIONS}"
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}

pub fn build_request(model: &str, req: &AnalyzeRequest) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: build_messages(&req.reference_text, &req.customer_text),
        reasoning_effort: "high".to_string(),
        stream: false,
        response_format: ResponseFormat::strict_schema(SCHEMA_NAME, response_schema()),
    }
}

/// Parse the model's message content into a typed result.
///
/// Tolerates a surrounding markdown code fence. A model-supplied `error`
/// field is discarded; `error` is reserved for the fallback.
pub fn parse_model_content(content: &str) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let mut result: AnalysisResult = serde_json::from_str(body.trim())?;
    result.error = None;
    Ok(result)
}

async fn request_analysis(
    chat: &dyn ChatCompletion,
    model: &str,
    req: &AnalyzeRequest,
) -> Result<AnalysisResult, AnalysisError> {
    let response = chat.complete(&build_request(model, req)).await?;
    let content = response.first_content().ok_or(AnalysisError::EmptyChoices)?;
    parse_model_content(content)
}

/// Run the comparison, substituting the fallback on any failure
pub async fn analyze(chat: &dyn ChatCompletion, model: &str, req: &AnalyzeRequest) -> AnalysisResult {
    match request_analysis(chat, model, req).await {
        Ok(result) => {
            info!(
                sections = result.sections.len(),
                risks = result.risks.len(),
                overall_risk = %result.summary.overall_risk,
                "Analysis complete"
            );
            result
        }
        Err(e) => {
            warn!("Analysis failed, returning fallback result: {}", e);
            fallback_result(&e.to_string())
        }
    }
}

fn section(title: &str, match_score: u8, differences: &str) -> SectionComparison {
    SectionComparison {
        title: title.to_string(),
        match_score,
        differences: differences.to_string(),
    }
}

fn risk(section: &str, severity: Severity, title: &str, description: &str, recommendation: &str) -> Risk {
    Risk {
        section: section.to_string(),
        severity,
        title: title.to_string(),
        description: description.to_string(),
        recommendation: recommendation.to_string(),
    }
}

/// Illustrative result shown when the real analysis is unavailable
pub fn fallback_result(reason: &str) -> AnalysisResult {
    AnalysisResult {
        sections: vec![
            section(
                "Definition of Confidential Information",
                85,
                "Customer NDA narrows the definition to information marked as confidential.",
            ),
            section(
                "Obligations of Receiving Party",
                70,
                "Customer NDA allows disclosure to affiliates without prior written consent.",
            ),
            section(
                "Term and Termination",
                60,
                "Confidentiality obligations survive two years instead of five.",
            ),
            section(
                "Return of Materials",
                90,
                "Largely equivalent; customer NDA permits archival copies.",
            ),
            section(
                "Governing Law",
                40,
                "Customer NDA selects a different jurisdiction and venue.",
            ),
        ],
        risks: vec![
            risk(
                "Term and Termination",
                Severity::High,
                "Shortened survival period",
                "Confidential information loses protection two years after termination.",
                "Restore a survival period of at least five years.",
            ),
            risk(
                "Governing Law",
                Severity::Medium,
                "Unfamiliar jurisdiction",
                "Disputes would be resolved under foreign law and venue.",
                "Negotiate the reference jurisdiction or a neutral venue.",
            ),
            risk(
                "Obligations of Receiving Party",
                Severity::Medium,
                "Affiliate disclosure",
                "Information may be shared with affiliates not bound by the agreement.",
                "Require affiliates to be bound by equivalent written obligations.",
            ),
            risk(
                "Definition of Confidential Information",
                Severity::Low,
                "Marking requirement",
                "Unmarked oral disclosures may fall outside the definition.",
                "Cover oral disclosures confirmed in writing within 30 days.",
            ),
        ],
        summary: Summary {
            overall_risk: Severity::Medium,
            key_issues: vec![
                "Shortened confidentiality survival period".to_string(),
                "Different governing law".to_string(),
                "Affiliate disclosure without consent".to_string(),
            ],
            recommendation: "Negotiate the survival period and governing law before signing."
                .to_string(),
        },
        error: Some(format!(
            "AI analysis unavailable, showing fallback data: {}",
            reason
        )),
    }
}
