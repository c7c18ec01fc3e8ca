//! Models command

use crate::app::OutputFormat;
use anyhow::Result;
use lexrag_core::{Config, ModelAdapter, OllamaAdapter};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let adapter = OllamaAdapter::from_config(config.model.clone())?;
    let models = adapter.list_models().await?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "default": adapter.default_model(),
                "models": models,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            for model in &models {
                let marker = if model == adapter.default_model() {
                    "*"
                } else {
                    " "
                };
                println!("{} {}", marker, model);
            }
            if !models.iter().any(|m| m == adapter.default_model()) {
                eprintln!(
                    "Default model {} is not installed on the backend",
                    adapter.default_model()
                );
            }
        }
    }
    Ok(())
}
