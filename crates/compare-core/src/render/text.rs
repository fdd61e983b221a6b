//! Plain-text report for terminals

use std::fmt::Write;

use shared_types::Severity;

use super::ReportView;

const BAR_WIDTH: usize = 20;

fn bar(percent: u8) -> String {
    let filled = (usize::from(percent.min(100)) * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "LOW",
        Severity::Medium => "MEDIUM",
        Severity::High => "HIGH",
    }
}

/// Render the report as plain text
pub fn render_report(report: &ReportView) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &ReportView) -> std::fmt::Result {
    writeln!(out, "NDA Comparison Report")?;
    writeln!(out, "=====================")?;

    if let Some(reason) = &report.degraded {
        writeln!(out)?;
        writeln!(out, "NOTE: {}", reason)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Overall risk:   {:<7} {} {}%",
        severity_label(report.overall_risk),
        bar(report.risk_weight),
        report.risk_weight
    )?;
    writeln!(
        out,
        "Average match:  {:<7} {} {}%",
        "",
        bar(report.average_match),
        report.average_match
    )?;
    writeln!(
        out,
        "Risks:          {} high, {} medium, {} low",
        report.risk_counts.high, report.risk_counts.medium, report.risk_counts.low
    )?;

    if !report.key_issues.is_empty() {
        writeln!(out)?;
        writeln!(out, "Key issues")?;
        for issue in &report.key_issues {
            writeln!(out, "  - {}", issue)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Recommendation")?;
    writeln!(out, "  {}", report.recommendation)?;

    if !report.sections.is_empty() {
        writeln!(out)?;
        writeln!(out, "Sections")?;
        for section in &report.sections {
            writeln!(out)?;
            writeln!(
                out,
                "  {} {:>3}%  {}",
                bar(section.match_score),
                section.match_score,
                section.title
            )?;
            if !section.differences.is_empty() {
                writeln!(out, "      {}", section.differences)?;
            }
            for line in &section.reference_excerpt {
                writeln!(out, "      reference > {}", line)?;
            }
            for line in &section.customer_excerpt {
                writeln!(out, "      customer  > {}", line)?;
            }
        }
    }

    if !report.risks.is_empty() {
        writeln!(out)?;
        writeln!(out, "Risks")?;
        for risk in &report.risks {
            writeln!(out)?;
            writeln!(
                out,
                "  [{}] {} ({})",
                severity_label(risk.severity),
                risk.title,
                risk.section
            )?;
            if !risk.description.is_empty() {
                writeln!(out, "      {}", risk.description)?;
            }
            if !risk.recommendation.is_empty() {
                writeln!(out, "      -> {}", risk.recommendation)?;
            }
        }
    }

    Ok(())
}
