//! ragweed CLI — the main entry point.
//!
//! Commands:
//! - `ask`    — Submit a single message and print the answer
//! - `chat`   — Interactive per-session chat
//! - `config` — Print the default configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ragweed",
    about = "ragweed — retrieval-augmented conversational agent",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a single message and print the answer
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,

        /// Session id (defaults to a fresh session)
        #[arg(short, long)]
        session: Option<String>,

        /// Plain-text documents to ingest for retrieval before asking
        #[arg(short, long)]
        docs: Vec<std::path::PathBuf>,

        /// Print the full turn result as JSON instead of just the answer
        #[arg(long)]
        json: bool,
    },

    /// Chat interactively within one session
    Chat {
        /// Session id (defaults to a fresh session)
        #[arg(short, long)]
        session: Option<String>,

        /// Plain-text documents to ingest for retrieval before starting
        #[arg(short, long)]
        docs: Vec<std::path::PathBuf>,
    },

    /// Print the default configuration TOML
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            message,
            session,
            docs,
            json,
        } => commands::ask::run(message, session, docs, json).await,
        Commands::Chat { session, docs } => commands::chat::run(session, docs).await,
        Commands::Config => commands::config_cmd::run(),
    }
}
