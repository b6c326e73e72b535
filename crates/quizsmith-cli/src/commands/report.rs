//! The `quizsmith report` command.

use std::path::PathBuf;

use anyhow::Result;

use quizsmith_core::report::Report;
use quizsmith_report::html::write_html_report;
use quizsmith_report::markdown::write_markdown_report;

pub fn execute(input: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let report = Report::load_json(&input)?;

    match format.as_str() {
        "text" => {
            println!(
                "Quiz report — {} (grade {}), {}",
                report.topic,
                report.grade,
                report.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!("Score: {} / {}", report.score, report.total);
            if report.ended_early {
                println!("Ended early ({} requested).", report.requested);
            }
            for (i, outcome) in report.outcomes.iter().enumerate() {
                let mark = if outcome.correct { "+" } else { "-" };
                println!(
                    "  {mark} {}. {} (answered: {}, correct: {})",
                    i + 1,
                    outcome.text,
                    outcome.submitted,
                    outcome.expected
                );
            }
            if !report.top_missed_concepts.is_empty() {
                println!("Concepts to review:");
                for concept in &report.top_missed_concepts {
                    println!("  {} ({} missed)", concept.concept, concept.misses);
                }
            }
        }
        "markdown" => {
            let path = output.unwrap_or_else(|| input.with_extension("md"));
            write_markdown_report(&report, &path)?;
            println!("Markdown report: {}", path.display());
        }
        "html" => {
            let path = output.unwrap_or_else(|| input.with_extension("html"));
            write_html_report(&report, &path)?;
            println!("HTML report: {}", path.display());
        }
        other => anyhow::bail!("unknown format: {other}"),
    }

    Ok(())
}
