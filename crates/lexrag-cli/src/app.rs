//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lexrag")]
#[command(
    author,
    version,
    about = "Ask questions about legal documents, answered from retrieved passages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "LEXRAG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a question from the indexed documents
    Ask(AskArgs),

    /// Show the passages closest to a question
    Search(SearchArgs),

    /// Embed texts with the embedding service
    Embed(EmbedArgs),

    /// List models on the generation backend
    Models,

    /// Check that every backend answers
    Status,

    /// Embed a chunk directory and upload it to the vector store
    Ingest(IngestArgs),

    /// Show or create the configuration
    Config(ConfigArgs),

    /// Start the HTTP API
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// Question
    pub query: Vec<String>,

    /// Generation model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Passages retrieved as evidence
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Show full passage text
    #[arg(long)]
    pub full: bool,
}

#[derive(Args)]
pub struct EmbedArgs {
    /// Texts to embed
    #[arg(required = true)]
    pub texts: Vec<String>,

    /// Parallel requests
    #[arg(short, long)]
    pub concurrency: Option<usize>,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Directory of chunk files, as seen by the embedding service
    pub input_dir: PathBuf,

    /// Points file to reuse (default: embeddings.json beside the directory)
    #[arg(long)]
    pub points_file: Option<PathBuf>,

    /// Drop and recreate the collection first
    #[arg(long)]
    pub recreate: bool,

    /// Expected vector length (default: embedding.dimensions)
    #[arg(long)]
    pub dimensions: Option<usize>,

    /// Points per upload request
    #[arg(long, default_value = "256")]
    pub batch_size: usize,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
