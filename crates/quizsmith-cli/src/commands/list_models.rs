//! The `quizsmith list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use quizsmith_providers::config::load_config_from;
use quizsmith_providers::create_source;

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut found_any = false;

    for (name, provider_config) in &config.providers {
        if let Some(filter) = &provider_filter {
            if name != filter {
                continue;
            }
        }

        let source = create_source(
            name,
            provider_config,
            &config.default_model,
            config.default_temperature,
        )?;
        let models = source.available_models();

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                println!(
                    "  {} — {} ({}K context)",
                    model.id,
                    model.name,
                    model.max_context / 1000,
                );
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `quizsmith init` to create a config file.");
    }

    Ok(())
}
