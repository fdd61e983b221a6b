//! Structured comparison returned by the analyze endpoint

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ParseEnumError;

/// Risk level shared by individual risks and the overall summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Fill level for the overall-risk gauge. Cosmetic only.
    pub fn display_weight(&self) -> u8 {
        match self {
            Severity::Low => 25,
            Severity::Medium => 60,
            Severity::High => 85,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(ParseEnumError {
                kind: "severity",
                value: s.to_string(),
            }),
        }
    }
}

/// Clause-level match between the two agreements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionComparison {
    pub title: String,
    /// Similarity score, 0..=100
    #[serde(rename = "match", deserialize_with = "deserialize_match_score")]
    pub match_score: u8,
    pub differences: String,
}

fn deserialize_match_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    // Models occasionally answer 87.5; round to the nearest whole percent
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// A flagged concern tied to a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub section: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

/// Executive summary of the comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub overall_risk: Severity,
    pub key_issues: Vec<String>,
    pub recommendation: String,
}

/// Full comparison result.
///
/// Either the model's schema-conformant answer or the fixed fallback; the
/// `error` field is present only on the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sections: Vec<SectionComparison>,
    pub risks: Vec<Risk>,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// True when this is the fallback substituted for a failed analysis
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Body of the analyze endpoint.
///
/// Missing fields deserialize as empty strings so the handler can reject
/// them with a 400 rather than a body-parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub reference_text: String,
    #[serde(default)]
    pub customer_text: String,
}

impl AnalyzeRequest {
    pub fn new(reference_text: impl Into<String>, customer_text: impl Into<String>) -> Self {
        Self {
            reference_text: reference_text.into(),
            customer_text: customer_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "sections": [
                { "title": "Term", "match": 72, "differences": "Shorter term" }
            ],
            "risks": [{
                "section": "Term",
                "severity": "high",
                "title": "Short survival",
                "description": "Obligations end after one year",
                "recommendation": "Extend to three years"
            }],
            "summary": {
                "overallRisk": "medium",
                "keyIssues": ["Term"],
                "recommendation": "Negotiate"
            }
        })
    }

    #[test]
    fn parses_schema_conformant_payload() {
        let result: AnalysisResult = serde_json::from_value(sample()).unwrap();
        assert_eq!(result.sections[0].match_score, 72);
        assert_eq!(result.risks[0].severity, Severity::High);
        assert_eq!(result.summary.overall_risk, Severity::Medium);
        assert!(!result.is_degraded());
    }

    #[test]
    fn match_score_is_clamped() {
        let mut value = sample();
        value["sections"][0]["match"] = json!(140);
        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.sections[0].match_score, 100);

        let mut value = sample();
        value["sections"][0]["match"] = json!(-5);
        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.sections[0].match_score, 0);

        let mut value = sample();
        value["sections"][0]["match"] = json!(72.6);
        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.sections[0].match_score, 73);
    }

    #[test]
    fn unknown_severity_is_rejected() {
        let mut value = sample();
        value["risks"][0]["severity"] = json!("critical");
        assert!(serde_json::from_value::<AnalysisResult>(value).is_err());
    }

    #[test]
    fn error_field_round_trips_only_when_set() {
        let result: AnalysisResult = serde_json::from_value(sample()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["sections"][0]["match"], 72);
    }

    #[test]
    fn display_weights() {
        assert_eq!(Severity::Low.display_weight(), 25);
        assert_eq!(Severity::Medium.display_weight(), 60);
        assert_eq!(Severity::High.display_weight(), 85);
    }

    #[test]
    fn analyze_request_defaults_missing_fields() {
        let req: AnalyzeRequest = serde_json::from_value(json!({ "referenceText": "a" })).unwrap();
        assert_eq!(req.reference_text, "a");
        assert!(req.customer_text.is_empty());
    }
}
