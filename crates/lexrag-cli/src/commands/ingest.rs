//! Ingest command

use crate::app::{IngestArgs, OutputFormat};
use anyhow::Result;
use lexrag_core::{run_ingestion, CancellationToken, Config, HttpEmbedder, IngestOptions, QdrantClient};

pub async fn run(
    args: IngestArgs,
    config: &Config,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let embedder = HttpEmbedder::new(config.embedding.clone())?;
    let store = QdrantClient::new(config.vector_store.clone())?;

    let mut options = IngestOptions::new(
        args.input_dir,
        args.dimensions.unwrap_or(config.embedding.dimensions),
    );
    options.points_file = args.points_file;
    options.recreate = args.recreate;
    options.batch_size = args.batch_size;

    let report = run_ingestion(&embedder, &store, &options, cancel).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Cli => {
            let source = if report.reused_points_file {
                "reused"
            } else {
                "generated"
            };
            println!("Points file: {} ({})", report.points_file.display(), source);
            if report.recreated_collection {
                println!("Recreated collection {}", store.collection());
            }
            println!(
                "Uploaded {} points to {} in {} batches",
                report.points,
                store.collection(),
                report.batches
            );
        }
    }
    Ok(())
}
