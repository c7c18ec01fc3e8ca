// Ask one question using lexrag as a library
//
// Needs the embedding service, Qdrant and Ollama running at the configured URLs.
//
//     cargo run -p lexrag-core --example ask -- "What does law 123 say about fines?"

use lexrag_core::{CancellationToken, Config, Query, QueryPipeline};

#[tokio::main]
async fn main() -> lexrag_core::Result<()> {
    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let config = Config::load()?;
    let pipeline = QueryPipeline::from_config(&config)?;

    let status = pipeline.check_services().await;
    if !status.all_ok() {
        eprintln!("Some backends are down: {:?}", status);
    }

    let response = pipeline
        .ask(Query::new(question), &CancellationToken::new())
        .await?;

    println!("{}\n", response.answer);
    for source in &response.sources {
        println!("{}", source);
    }
    Ok(())
}
