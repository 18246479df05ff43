//! `reverie embed-pending` - operator retry for stories without embeddings.
//!
//! Unlike the server's fire-and-forget pipeline this runs synchronously,
//! story by story, so the operator sees each outcome and a non-zero exit
//! when anything failed.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use tracing::{info, warn};

use reverie_inference::{HttpInference, Inference, InferenceConfig};
use reverie_store::RecordStore;

#[derive(Args)]
pub struct EmbedPendingArgs {
    /// Path to the SQLite database
    #[arg(long, env = "REVERIE_DB", default_value = "reverie.db")]
    pub db: PathBuf,

    /// Base URL of the inference service
    #[arg(long, env = "REVERIE_INFERENCE_URL", default_value = "http://localhost:8000")]
    pub inference_url: String,

    /// Inference request timeout in seconds
    #[arg(long, env = "REVERIE_INFERENCE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

pub async fn run(args: EmbedPendingArgs) -> Result<()> {
    let store = RecordStore::open(&args.db)?;
    let inference = HttpInference::new(
        InferenceConfig::new(&args.inference_url)
            .with_timeout(Duration::from_secs(args.timeout_secs)),
    )?;

    let pending = store.find_stories_without_embedding()?;
    if pending.is_empty() {
        info!("No stories awaiting embedding");
        return Ok(());
    }
    info!(count = pending.len(), "Embedding pending stories");

    let total = pending.len();
    let mut failed = 0usize;
    for story in pending {
        match inference.embed(&story.content).await {
            Ok(vector) => {
                store.set_story_embedding(story.id, &vector)?;
                info!(story_id = story.id, title = %story.title, "Embedded");
            }
            Err(e) => {
                warn!(story_id = story.id, title = %story.title, error = %e, "Failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} stories failed to embed", failed, total);
    }
    info!(count = total, "All pending stories embedded");
    Ok(())
}
