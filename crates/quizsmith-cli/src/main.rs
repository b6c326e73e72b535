//! quizsmith CLI — the terminal client for adaptive practice quizzes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizsmith", version, about = "Adaptive LLM practice-quiz engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one interactive quiz session
    Play {
        /// Quiz topic ("language" or "math")
        #[arg(long)]
        topic: String,

        /// School grade, 1 through 12
        #[arg(long)]
        grade: u8,

        /// Number of questions
        #[arg(long, default_value = "5")]
        count: usize,

        /// Optional subtopic emphasis (e.g. "fractions")
        #[arg(long)]
        subtopic: Option<String>,

        /// Questions generated per block (default: whole quiz up front)
        #[arg(long)]
        block_size: Option<usize>,

        /// Source to generate with ("openai/gpt-4.1-mini", "mock", ...)
        #[arg(long)]
        provider: Option<String>,

        /// Output directory for report artifacts
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report formats: json, markdown, html (comma-separated or "all")
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render a saved report
    Report {
        /// Report JSON produced by `play`
        #[arg(long)]
        input: PathBuf,

        /// Output format: text, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (defaults next to the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to a specific source
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizsmith=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            topic,
            grade,
            count,
            subtopic,
            block_size,
            provider,
            output,
            format,
            config,
        } => {
            commands::play::execute(
                topic, grade, count, subtopic, block_size, provider, output, format, config,
            )
            .await
        }
        Commands::Report {
            input,
            format,
            output,
        } => commands::report::execute(input, format, output),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
