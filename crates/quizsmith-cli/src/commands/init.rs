//! The `quizsmith init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizsmith.toml").exists() {
        println!("quizsmith.toml already exists, skipping.");
    } else {
        std::fs::write("quizsmith.toml", SAMPLE_CONFIG)?;
        println!("Created quizsmith.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizsmith.toml with your API keys");
    println!("  2. Run: quizsmith play --topic math --grade 5 --count 3");
    println!("  3. No key yet? Try: quizsmith play --topic math --grade 5 --provider mock");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizsmith configuration

default_provider = "openai"
default_model = "gpt-4.1-mini"
default_temperature = 0.7

# Generation attempts per block before giving up.
max_attempts = 5
retry_delay_ms = 1000

# Questions generated per block. Omit to pre-fill the whole quiz at start.
# block_size = 3

# What a correct answer does at hard difficulty: "saturate" or "oscillate".
ceiling = "saturate"

output_dir = "./quizsmith-results"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;
