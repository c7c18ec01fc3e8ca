//! Ask command

use crate::app::{AskArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use lexrag_core::{CancellationToken, Config, Query, QueryPipeline};

pub async fn run(
    args: AskArgs,
    config: &Config,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let pipeline = QueryPipeline::from_config(config)?;

    let mut query = Query::new(args.query.join(" "));
    if let Some(model) = args.model {
        if let Ok(false) = pipeline.model().is_model_available(&model).await {
            eprintln!("Warning: model {} is not installed on the backend", model);
        }
        query = query.with_model(model);
    }
    if let Some(limit) = args.limit {
        query = query.with_limit(limit);
    }

    let response = pipeline.ask(query, cancel).await?;
    print!("{}", output::format_answer(&response, format)?);
    Ok(())
}
