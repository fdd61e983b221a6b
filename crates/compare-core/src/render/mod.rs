//! Display-side views of an analysis result
//!
//! Pure functions only. Nothing here changes the scores or risks returned
//! by the analysis; it sorts, counts and decorates them for display.

use serde::Serialize;
use shared_types::{AnalysisResult, Risk, SectionComparison, Severity, UploadedDocument};

pub mod excerpt;
pub mod text;

pub use excerpt::excerpt_for_section;
pub use text::render_report;

/// Risks bucketed by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskCounts {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

pub fn risk_counts(risks: &[Risk]) -> RiskCounts {
    risks.iter().fold(RiskCounts::default(), |mut counts, risk| {
        match risk.severity {
            Severity::Low => counts.low += 1,
            Severity::Medium => counts.medium += 1,
            Severity::High => counts.high += 1,
        }
        counts
    })
}

/// Mean section match, rounded; 0 when there are no sections
pub fn average_match(sections: &[SectionComparison]) -> u8 {
    if sections.is_empty() {
        return 0;
    }
    let sum: u32 = sections.iter().map(|s| u32::from(s.match_score)).sum();
    let len = sections.len() as u32;
    ((sum + len / 2) / len) as u8
}

/// Sections ordered weakest match first; equal scores keep their order
pub fn sections_by_match(sections: &[SectionComparison]) -> Vec<&SectionComparison> {
    let mut sorted: Vec<&SectionComparison> = sections.iter().collect();
    sorted.sort_by_key(|s| s.match_score);
    sorted
}

/// Risks ordered high → low; equal severities keep their order
pub fn risks_by_severity(risks: &[Risk]) -> Vec<&Risk> {
    let mut sorted: Vec<&Risk> = risks.iter().collect();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
    sorted
}

/// Risks attached to a section, matched case-insensitively by title
pub fn risks_for_section<'a>(risks: &'a [Risk], section_title: &str) -> Vec<&'a Risk> {
    risks
        .iter()
        .filter(|r| r.section.eq_ignore_ascii_case(section_title))
        .collect()
}

/// One row of the section comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub title: String,
    pub match_score: u8,
    pub differences: String,
    pub reference_excerpt: Vec<String>,
    pub customer_excerpt: Vec<String>,
}

/// Everything the report screens display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub overall_risk: Severity,
    pub risk_weight: u8,
    pub average_match: u8,
    pub risk_counts: RiskCounts,
    pub key_issues: Vec<String>,
    pub recommendation: String,
    pub sections: Vec<SectionView>,
    pub risks: Vec<Risk>,
    pub degraded: Option<String>,
}

fn excerpt(doc: Option<&UploadedDocument>, title: &str, index: usize) -> Vec<String> {
    doc.map(|d| {
        excerpt_for_section(title, d.text(), index)
            .into_iter()
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Build the report view. Excerpts are taken from whichever documents are
/// supplied; section order follows the analysis.
pub fn build_report(
    result: &AnalysisResult,
    reference: Option<&UploadedDocument>,
    customer: Option<&UploadedDocument>,
) -> ReportView {
    let sections = result
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| SectionView {
            title: section.title.clone(),
            match_score: section.match_score,
            differences: section.differences.clone(),
            reference_excerpt: excerpt(reference, &section.title, index),
            customer_excerpt: excerpt(customer, &section.title, index),
        })
        .collect();

    ReportView {
        overall_risk: result.summary.overall_risk,
        risk_weight: result.summary.overall_risk.display_weight(),
        average_match: average_match(&result.sections),
        risk_counts: risk_counts(&result.risks),
        key_issues: result.summary.key_issues.clone(),
        recommendation: result.summary.recommendation.clone(),
        sections,
        risks: risks_by_severity(&result.risks).into_iter().cloned().collect(),
        degraded: result.error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{DocumentRole, ParsedContent, Summary};

    fn risk(section: &str, severity: Severity, title: &str) -> Risk {
        Risk {
            section: section.into(),
            severity,
            title: title.into(),
            description: String::new(),
            recommendation: String::new(),
        }
    }

    fn section(title: &str, score: u8) -> SectionComparison {
        SectionComparison {
            title: title.into(),
            match_score: score,
            differences: String::new(),
        }
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            sections: vec![
                section("Confidential Information", 90),
                section("Term", 45),
                section("Governing Law", 70),
            ],
            risks: vec![
                risk("Term", Severity::Medium, "a"),
                risk("Term", Severity::High, "b"),
                risk("Governing Law", Severity::Low, "c"),
                risk("Confidential Information", Severity::High, "d"),
            ],
            summary: Summary {
                overall_risk: Severity::High,
                key_issues: vec!["Term".into()],
                recommendation: "Negotiate".into(),
            },
            error: None,
        }
    }

    #[test]
    fn counts_by_severity() {
        let counts = risk_counts(&result().risks);
        assert_eq!(counts, RiskCounts { low: 1, medium: 1, high: 2 });
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.get(Severity::High), 2);
    }

    #[test]
    fn average_match_rounds() {
        assert_eq!(average_match(&result().sections), 68);
        assert_eq!(average_match(&[]), 0);
        assert_eq!(average_match(&[section("a", 50), section("b", 51)]), 51);
    }

    #[test]
    fn sorting_is_stable() {
        let r = result();
        let titles: Vec<&str> = risks_by_severity(&r.risks).iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "d", "a", "c"]);

        let sections: Vec<u8> = sections_by_match(&r.sections).iter().map(|s| s.match_score).collect();
        assert_eq!(sections, vec![45, 70, 90]);
    }

    #[test]
    fn risks_for_section_ignores_case() {
        let r = result();
        assert_eq!(risks_for_section(&r.risks, "term").len(), 2);
        assert!(risks_for_section(&r.risks, "Remedies").is_empty());
    }

    #[test]
    fn report_includes_excerpts_and_weight() {
        let doc = UploadedDocument {
            file_name: "ref.pdf".into(),
            document_type: DocumentRole::ReferenceNda,
            parsed_content: ParsedContent {
                text: "All Confidential Information stays protected. The term is five years long."
                    .into(),
                html: String::new(),
                elements: vec![],
                pages: 1,
            },
        };

        let report = build_report(&result(), Some(&doc), None);
        assert_eq!(report.risk_weight, 85);
        assert_eq!(report.sections.len(), 3);
        assert_eq!(
            report.sections[0].reference_excerpt,
            vec!["All Confidential Information stays protected".to_string()]
        );
        assert_eq!(
            report.sections[1].reference_excerpt,
            vec!["The term is five years long".to_string()]
        );
        assert!(report.sections[0].customer_excerpt.is_empty());
        assert_eq!(report.risks[0].severity, Severity::High);
        assert!(report.degraded.is_none());
    }
}
