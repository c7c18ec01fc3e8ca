//! Embed command

use crate::app::{EmbedArgs, OutputFormat};
use anyhow::Result;
use lexrag_core::{CancellationToken, Config, Embedder, HttpEmbedder};

pub async fn run(
    args: EmbedArgs,
    config: &Config,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let embedder = HttpEmbedder::new(config.embedding.clone())?;
    let concurrency = args
        .concurrency
        .unwrap_or(config.embedding.batch_concurrency);

    let batch = embedder
        .embed_batch(&args.texts, concurrency, cancel)
        .await?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "model": embedder.model_name(),
                "vectors": batch.vectors,
                "dim": batch.dimensions(),
                "failedIndices": batch.failed_indices(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!("Model:      {}", embedder.model_name());
            println!("Dimensions: {}", batch.dimensions());
            for (text, slot) in args.texts.iter().zip(&batch.vectors) {
                match slot {
                    Some(vector) => println!("  ok      {} ({} values)", text, vector.len()),
                    None => println!("  failed  {}", text),
                }
            }
            for failure in &batch.failures {
                eprintln!("Item {} failed: {}", failure.index, failure.reason);
            }
        }
    }

    if batch.vectors.iter().all(Option::is_none) {
        return Err(lexrag_core::LexRagError::EmbeddingUnavailable(
            "every item failed".to_string(),
        )
        .into());
    }
    Ok(())
}
