//! Lexrag CLI
//!
//! Question answering over legal documents from the terminal.

use anyhow::Result;
use clap::Parser;
use lexrag_core::error::exit_codes;
use lexrag_core::{CancellationToken, Config, LexRagError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let load = || Config::load_from(&config_path);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, &load()?, cli.format, &cancel).await,
        Commands::Search(args) => {
            commands::search::run(args, &load()?, cli.format, &cancel).await
        }
        Commands::Embed(args) => commands::embed::run(args, &load()?, cli.format, &cancel).await,
        Commands::Models => commands::models::run(&load()?, cli.format).await,
        Commands::Status => commands::status::run(&load()?, cli.format).await,
        Commands::Ingest(args) => {
            commands::ingest::run(args, &load()?, cli.format, &cancel).await
        }
        Commands::Serve(args) => commands::serve::run(args, load()?).await,
        // Works even when the file on disk is broken
        Commands::Config(args) => commands::config::run(args, &config_path, cli.format),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<LexRagError>()
        .map(LexRagError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
