//! `reverie serve` - run the HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;

use reverie_chat::{ChatService, DEFAULT_BACKLOG, EmbeddingPipeline, StoryService};
use reverie_inference::{HttpInference, InferenceConfig, SharedInference};
use reverie_server::{AppState, Server, ServerConfig};
use reverie_store::RecordStore;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind the server to
    #[arg(long, env = "REVERIE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Path to the SQLite database
    #[arg(long, env = "REVERIE_DB", default_value = "reverie.db")]
    pub db: PathBuf,

    /// Base URL of the inference service
    #[arg(long, env = "REVERIE_INFERENCE_URL", default_value = "http://localhost:8000")]
    pub inference_url: String,

    /// Inference request timeout in seconds
    #[arg(long, env = "REVERIE_INFERENCE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Embedding backlog size
    #[arg(long, env = "REVERIE_EMBED_BACKLOG", default_value_t = DEFAULT_BACKLOG)]
    pub embed_backlog: usize,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let store = Arc::new(RecordStore::open(&args.db)?);
    let stats = store.stats()?;
    info!(
        users = stats.user_count,
        characters = stats.character_count,
        messages = stats.message_count,
        stories = stats.story_count,
        embedded = stats.embedded_story_count,
        "Record store ready"
    );

    let inference_config = InferenceConfig::new(&args.inference_url)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let inference: SharedInference = Arc::new(HttpInference::new(inference_config)?);

    let chat = ChatService::new(Arc::clone(&store), inference.clone());
    let pipeline =
        EmbeddingPipeline::spawn(Arc::clone(&store), inference.clone(), args.embed_backlog);
    let stories = StoryService::new(Arc::clone(&store), inference, pipeline);

    let state = AppState::new(chat, stories, store);
    let config = ServerConfig::new().with_bind_address(args.bind);

    Server::new(state, config).run().await?;
    Ok(())
}
