//! Search command

use crate::app::{OutputFormat, SearchArgs};
use crate::output::{self, FormatOptions};
use anyhow::Result;
use lexrag_core::{CancellationToken, Config, QueryPipeline};

pub async fn run(
    args: SearchArgs,
    config: &Config,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let pipeline = QueryPipeline::from_config(config)?;
    let query = args.query.join(" ");

    let results = pipeline.retrieve(&query, args.limit, cancel).await?;

    if results.is_empty() && format == OutputFormat::Cli {
        eprintln!("No results found for \"{}\"", query);
        return Ok(());
    }

    let options = FormatOptions { full: args.full };
    print!("{}", output::format_search_results(&results, format, &options));
    Ok(())
}
