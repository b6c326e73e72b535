//! The `quizsmith play` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use quizsmith_core::model::{QuizConfig, Topic};
use quizsmith_core::report::Report;
use quizsmith_core::service::{CurrentQuestion, QuizService, ServiceConfig};
use quizsmith_core::traits::QuestionSource;
use quizsmith_providers::config::load_config_from;
use quizsmith_providers::create_source;
use quizsmith_providers::mock::MockSource;
use quizsmith_report::html::write_html_report;
use quizsmith_report::markdown::write_markdown_report;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    topic: String,
    grade: u8,
    count: usize,
    subtopic: Option<String>,
    block_size: Option<usize>,
    provider: Option<String>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let topic: Topic = topic.parse().map_err(|e: String| anyhow::anyhow!("{e}"))?;

    // "provider" or "provider/model"
    let (provider_name, model) = match &provider {
        Some(spec) => {
            let parts: Vec<&str> = spec.trim().splitn(2, '/').collect();
            if parts.len() == 2 {
                (parts[0].to_string(), parts[1].to_string())
            } else {
                (parts[0].to_string(), config.default_model.clone())
            }
        }
        None => (
            config.default_provider.clone(),
            config.default_model.clone(),
        ),
    };

    let source: Arc<dyn QuestionSource> = if provider_name == "mock" {
        Arc::new(MockSource::new())
    } else if let Some(provider_config) = config.providers.get(&provider_name) {
        Arc::from(create_source(
            &provider_name,
            provider_config,
            &model,
            config.default_temperature,
        )?)
    } else {
        anyhow::bail!(
            "provider '{}' not found in config. Available: {:?} (or \"mock\")",
            provider_name,
            config.providers.keys().collect::<Vec<_>>()
        );
    };

    let mut service_config: ServiceConfig = config.service_config();
    if let Some(size) = block_size {
        service_config.engine.block_size = Some(size);
    }
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());

    let service = QuizService::new(source, service_config);

    eprintln!("Generating questions ({provider_name}/{model})...");
    let session_id = service
        .start_session(QuizConfig {
            topic,
            grade,
            target_count: count,
            subtopic_hint: subtopic,
        })
        .await?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let view = match service.current_question(session_id).await? {
            CurrentQuestion::Question(view) => view,
            CurrentQuestion::Finished => break,
        };

        println!();
        println!(
            "Question {} of {} ({}%)",
            view.index + 1,
            view.total,
            view.progress_percent
        );
        println!("{}", view.text);
        for (i, choice) in view.choices.iter().enumerate() {
            println!("  {}) {}", i + 1, choice);
        }
        print!("Your answer [1-{}]: ", view.choices.len());
        io::stdout().flush()?;

        let started = Instant::now();
        let choice = loop {
            let Some(line) = lines.next() else {
                anyhow::bail!("input closed before the quiz finished");
            };
            let line = line?;
            let trimmed = line.trim();
            match trimmed.parse::<usize>() {
                Ok(n) if (1..=view.choices.len()).contains(&n) => {
                    break view.choices[n - 1].clone()
                }
                _ => {
                    // the choice text itself is also accepted
                    if let Some(matched) = view.choices.iter().find(|c| c.as_str() == trimmed) {
                        break matched.clone();
                    }
                    print!("Please enter a number between 1 and {}: ", view.choices.len());
                    io::stdout().flush()?;
                }
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let ack = service.submit_answer(session_id, &choice, elapsed_ms).await?;
        if ack.correct {
            println!("Correct!");
        } else {
            println!("Not quite — the answer was: {}", ack.answer);
        }
        if !ack.explanation.is_empty() {
            println!("  {}", ack.explanation);
        }
    }

    let report = service.report(session_id).await?;
    print_summary(&report);
    save_artifacts(&report, &output_dir, &format)?;

    Ok(())
}

fn print_summary(report: &Report) {
    use comfy_table::{Cell, Table};

    println!();
    println!("You scored {} out of {}.", report.score, report.total);
    if report.ended_early {
        println!(
            "(The quiz ended early: {} of {} requested questions could be generated.)",
            report.total, report.requested
        );
    }

    if !report.top_missed_concepts.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Concept to review", "Missed"]);
        for concept in &report.top_missed_concepts {
            table.add_row(vec![
                Cell::new(&concept.concept),
                Cell::new(concept.misses),
            ]);
        }
        println!("\n{table}");
    }
}

fn save_artifacts(report: &Report, output_dir: &std::path::Path, format: &str) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "markdown", "html"]
    } else {
        format.split(',').map(|s| s.trim()).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output_dir.join(format!("quiz-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "markdown" => {
                let path = output_dir.join(format!("quiz-{timestamp}.md"));
                write_markdown_report(report, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            "html" => {
                let path = output_dir.join(format!("quiz-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}
