//! Markdown report rendering.

use std::path::Path;

use anyhow::{Context, Result};

use quizsmith_core::report::Report;

/// Escape characters that would break a markdown table cell.
fn md_escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Render a report as a markdown document.
pub fn render_markdown(report: &Report) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# Quiz report — {} (grade {})\n\n",
        report.topic, report.grade
    ));
    md.push_str(&format!("**Score:** {} / {}", report.score, report.total));
    if report.ended_early {
        md.push_str(&format!(" ({} requested; ended early)", report.requested));
    }
    md.push_str(&format!(
        "  \n**Taken:** {}\n\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if !report.outcomes.is_empty() {
        md.push_str("## Questions\n\n");
        md.push_str("| # | Question | Your answer | Correct answer | Result | Time |\n");
        md.push_str("|---|----------|-------------|----------------|--------|------|\n");
        for (i, outcome) in report.outcomes.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.1}s |\n",
                i + 1,
                md_escape(&outcome.text),
                md_escape(&outcome.submitted),
                md_escape(&outcome.expected),
                if outcome.correct { "correct" } else { "missed" },
                outcome.elapsed_ms as f64 / 1000.0,
            ));
        }
        md.push('\n');
    }

    if !report.top_missed_concepts.is_empty() {
        md.push_str("## Concepts to review\n\n");
        md.push_str("| Concept | Missed |\n");
        md.push_str("|---------|--------|\n");
        for concept in &report.top_missed_concepts {
            md.push_str(&format!(
                "| {} | {} |\n",
                md_escape(&concept.concept),
                concept.misses
            ));
        }
    }

    md
}

/// Render a report and write it to a file.
pub fn write_markdown_report(report: &Report, path: &Path) -> Result<()> {
    let md = render_markdown(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, md)
        .with_context(|| format!("failed to write markdown report to {}", path.display()))?;
    Ok(())
}
