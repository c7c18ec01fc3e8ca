//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use lexrag_core::{Config, LexRagError, QueryPipeline};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let pipeline = QueryPipeline::from_config(config)?;
    let status = pipeline.check_services().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Cli => {
            println!(
                "Vector store:  {:<5} {} ({})",
                label(status.vector_store),
                config.vector_store.url,
                config.vector_store.collection
            );
            println!(
                "Embedding:     {:<5} {}",
                label(status.embedding),
                config.embedding.url
            );
            println!("Model:         {:<5} {}", label(status.model), config.model.url);
            if !status.models.is_empty() {
                println!();
                println!("Models:        {}", status.models.join(", "));
            }
        }
    }

    if !status.vector_store {
        return Err(LexRagError::SearchUnavailable(config.vector_store.url.clone()).into());
    }
    if !status.embedding {
        return Err(LexRagError::EmbeddingUnavailable(config.embedding.url.clone()).into());
    }
    if !status.model {
        return Err(LexRagError::ModelUnavailable(config.model.url.clone()).into());
    }
    Ok(())
}

fn label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "DOWN"
    }
}
