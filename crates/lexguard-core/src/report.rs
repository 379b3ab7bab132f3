use std::fmt::Write;

use crate::pipeline::AnalysisResult;

/// Format styles supported in default reporter implementations.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Produce a report string from an `AnalysisResult` using the desired format.
pub fn render_report(result: &AnalysisResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(result),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}

fn render_human(result: &AnalysisResult) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "Risk Score: {}", result.risk_score)?;
    writeln!(out)?;

    writeln!(out, "Summary:")?;
    writeln!(out, "  {}", sanitize_line(&result.full_summary))?;
    writeln!(out)?;

    if result.categories.is_empty() {
        writeln!(out, "No clauses scored.")?;
    } else {
        writeln!(out, "Categories:")?;
        for (category, group) in &result.categories {
            writeln!(
                out,
                "  {label} [{level}]",
                label = category.label(),
                level = group.risk_level.as_str()
            )?;
            for point in &group.points {
                writeln!(out, "    - {}", sanitize_line(point))?;
            }
        }
    }

    writeln!(out)?;
    if result.key_findings.is_empty() {
        writeln!(out, "No key findings.")?;
    } else {
        writeln!(out, "Key Findings:")?;
        for finding in &result.key_findings {
            writeln!(
                out,
                "  {icon} {title} ({section}) [{level}]",
                icon = finding.icon,
                title = finding.title,
                section = finding.section,
                level = finding.risk_level.as_str()
            )?;
            writeln!(out, "    {}", finding.description)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Review Questions:")?;
    for (idx, question) in result.legal_questions.as_slice().iter().enumerate() {
        writeln!(out, "  {}. {}", idx + 1, question)?;
    }

    Ok(out)
}

fn sanitize_line(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            _ => c,
        })
        .collect()
}
