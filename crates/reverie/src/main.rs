//! Reverie - persona-driven AI character chat service.
//!
//! Main entry point for the Reverie CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{embed_pending, seed, serve};

/// Reverie - persona-driven AI character chat service
#[derive(Parser)]
#[command(name = "reverie")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(serve::ServeArgs),

    /// Create demo user and sample characters
    Seed(seed::SeedArgs),

    /// Re-embed all stories that have no embedding yet
    EmbedPending(embed_pending::EmbedPendingArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Seed(args) => seed::run(args),
        Commands::EmbedPending(args) => embed_pending::run(args).await,
    }
}
