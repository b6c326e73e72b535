//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use std::path::Path;

use anyhow::{Context, Result};

use quizsmith_core::report::Report;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML document from a quiz report.
pub fn generate_html(report: &Report) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizsmith report — {} (grade {})</title>\n",
        html_escape(&report.topic.to_string()),
        report.grade
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>quizsmith report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Topic: <strong>{}</strong> | Grade {} | {}</p>\n",
        html_escape(&report.topic.to_string()),
        report.grade,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score banner
    html.push_str("<section class=\"score\">\n");
    html.push_str(&format!(
        "<p class=\"headline\">You scored {} out of {}.</p>\n",
        report.score, report.total
    ));
    if report.ended_early {
        html.push_str(&format!(
            "<p class=\"note\">The quiz ended early: {} of {} requested questions could be generated.</p>\n",
            report.total, report.requested
        ));
    }
    html.push_str("</section>\n");

    // Per-question outcomes
    if !report.outcomes.is_empty() {
        html.push_str("<section class=\"results\">\n");
        html.push_str("<h2>Questions</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>#</th><th>Question</th><th>Your answer</th><th>Correct answer</th><th>Result</th><th>Time</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (i, outcome) in report.outcomes.iter().enumerate() {
            let class = if outcome.correct { "pass" } else { "fail" };
            let result = if outcome.correct { "correct" } else { "missed" };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{:.1}s</td></tr>\n",
                class,
                i + 1,
                html_escape(&outcome.text),
                html_escape(&outcome.submitted),
                html_escape(&outcome.expected),
                class,
                result,
                outcome.elapsed_ms as f64 / 1000.0,
            ));
            if !outcome.explanation.is_empty() {
                html.push_str(&format!(
                    "<tr class=\"explanation\"><td></td><td colspan=\"5\">{}</td></tr>\n",
                    html_escape(&outcome.explanation)
                ));
            }
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Missed concepts
    if !report.top_missed_concepts.is_empty() {
        html.push_str("<section class=\"concepts\">\n");
        html.push_str("<h2>Concepts to review</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Concept</th><th>Missed</th></tr></thead>\n<tbody>\n");
        for concept in &report.top_missed_concepts {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(&concept.concept),
                concept.misses
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Generate an HTML report and write it to a file.
pub fn write_html_report(report: &Report, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 2rem auto; max-width: 56rem; padding: 0 1rem; color: #1f2430; }
header h1 { margin-bottom: 0.25rem; }
.meta { color: #667085; margin-top: 0; }
.score .headline { font-size: 1.4rem; font-weight: 600; }
.score .note { color: #b54708; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid #e4e7ec; padding: 0.5rem 0.75rem; text-align: left; }
th { background: #f9fafb; }
td.pass { color: #067647; font-weight: 600; }
td.fail { color: #b42318; font-weight: 600; }
tr.explanation td { color: #667085; font-size: 0.9rem; border-top: none; }
"#;
