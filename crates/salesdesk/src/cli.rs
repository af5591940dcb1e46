use clap::{Args, Parser, Subcommand, ValueEnum};
use salesdesk_telemetry::ExportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "salesdesk")]
#[command(version)]
#[command(about = "Ask questions about a sales order dataset")]
pub struct Cli {
    #[command(flatten)]
    pub globals: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Sales CSV export
    #[arg(long, global = true, default_value = "sales_data_sample.csv")]
    pub data: PathBuf,

    /// JSON config file (defaults to ./salesdesk.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Embedding backend
    #[arg(long, global = true, value_enum, default_value_t = EmbedderKind::Fastembed)]
    pub embedder: EmbedderKind,

    /// Never call the hosted language model
    #[arg(long, global = true)]
    pub offline: bool,

    /// Directory for the query log and embedding cache (defaults to ~/.salesdesk)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Offline feature hashing
    Hash,
    /// Local MiniLM model via fastembed
    Fastembed,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Answer questions read from stdin, one per line
    Chat,

    /// List the precomputed insights
    Insights {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the nearest corpus snippets for a query
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of results
        #[arg(short, long, default_value_t = 3)]
        k: usize,
    },

    /// Inspect the query log
    Log {
        #[command(subcommand)]
        action: Option<LogAction>,
    },

    /// Print a JSON summary of the loaded dataset and index
    Status,

    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub enum LogAction {
    /// Print the log as text
    Show,
    /// Write the log as CSV or JSONL
    Export {
        /// csv or jsonl
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Destination file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
