//! Asynchronous story embedding pipeline.
//!
//! Embedding runs outside the request/response cycle: `queue` hands a story
//! id to a bounded backlog and returns immediately; a spawned worker drains
//! the backlog, calls the inference service, and writes the vector back onto
//! the story row. A worker failure is logged and counted, never propagated —
//! no caller is waiting for it. The bounded backlog is the backpressure
//! point, and the counters make pending/failed work inspectable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use reverie_inference::{Inference, SharedInference};
use reverie_store::RecordStore;
use reverie_types::Id;

use crate::error::{ChatError, Result};

/// Default backlog size for queued embedding jobs.
pub const DEFAULT_BACKLOG: usize = 64;

/// A queued embedding job.
#[derive(Debug, Clone, Copy)]
struct EmbedJob {
    story_id: Id,
}

#[derive(Debug, Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

/// Handle to the embedding worker.
///
/// Cheap to clone; all clones feed the same backlog. The worker task has no
/// cancellation hook — once a job is accepted it runs to completion or
/// failure.
#[derive(Clone)]
pub struct EmbeddingPipeline {
    sender: mpsc::Sender<EmbedJob>,
    counters: Arc<Counters>,
}

impl EmbeddingPipeline {
    /// Spawn the worker task and return a handle to it.
    pub fn spawn(store: Arc<RecordStore>, inference: SharedInference, backlog: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<EmbedJob>(backlog.max(1));
        let counters = Arc::new(Counters::default());

        let worker_counters = Arc::clone(&counters);
        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                match run_job(&store, inference.as_ref(), job.story_id).await {
                    Ok(true) => {
                        worker_counters.completed.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(false) => {
                        debug!(story_id = job.story_id, "Story gone before embedding; skipped");
                    }
                    Err(e) => {
                        warn!(story_id = job.story_id, error = %e, "Failed to embed story");
                        worker_counters.failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            debug!("Embedding worker stopped");
        });

        Self { sender, counters }
    }

    /// Queue a story for embedding. Fire-and-forget: returns as soon as the
    /// job is accepted; completion is eventually consistent.
    ///
    /// A full backlog returns [`ChatError::EmbedQueueFull`] — the caller's
    /// signal to back off or retry later.
    pub fn queue(&self, story_id: Id) -> Result<()> {
        match self.sender.try_send(EmbedJob { story_id }) {
            Ok(()) => {
                debug!(story_id, "Embedding job queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                Err(ChatError::EmbedQueueFull)
            }
        }
    }

    /// Current pipeline statistics.
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            queued: self.sender.max_capacity() - self.sender.capacity(),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Load, embed, and persist one story. `Ok(false)` means the story
/// disappeared before or during the job.
async fn run_job(
    store: &RecordStore,
    inference: &dyn Inference,
    story_id: Id,
) -> Result<bool> {
    let Some(story) = store.find_story_by_id(story_id)? else {
        return Ok(false);
    };

    let vector = inference.embed(&story.content).await?;
    let updated = store.set_story_embedding(story_id, &vector)?;

    if updated {
        debug!(story_id, dimensions = vector.len(), "Story embedded");
    }
    Ok(updated)
}

/// Snapshot of pipeline activity.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStats {
    /// Jobs currently waiting in the backlog.
    pub queued: usize,
    /// Jobs that produced and persisted a vector.
    pub completed: u64,
    /// Jobs that failed (embedding call or store write).
    pub failed: u64,
    /// Jobs rejected because the backlog was full.
    pub rejected: u64,
}
