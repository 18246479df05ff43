//! Story management and similarity search.

use std::sync::Arc;

use tracing::{debug, warn};

use reverie_inference::{Inference, SharedInference};
use reverie_store::{RecordStore, SimilarStory};
use reverie_types::{Id, Story};

use crate::error::{ChatError, Result};
use crate::pipeline::{EmbeddingPipeline, PipelineStats};

/// Story operations: creation (with fire-and-forget embedding), operator
/// re-embedding, and distance-ranked retrieval.
#[derive(Clone)]
pub struct StoryService {
    store: Arc<RecordStore>,
    inference: SharedInference,
    pipeline: EmbeddingPipeline,
}

impl StoryService {
    /// Create a story service around an already-spawned pipeline.
    pub fn new(
        store: Arc<RecordStore>,
        inference: SharedInference,
        pipeline: EmbeddingPipeline,
    ) -> Self {
        Self {
            store,
            inference,
            pipeline,
        }
    }

    /// Create a story and schedule its embedding.
    ///
    /// Returns as soon as the story is durable — the embedding completes
    /// eventually (or not; the story then stays discoverable via
    /// [`stories_without_embedding`](Self::stories_without_embedding)).
    /// A full embedding backlog does not fail the creation.
    pub async fn create_story(
        &self,
        character_id: Id,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Story> {
        self.store
            .find_character_by_id(character_id)?
            .ok_or(ChatError::CharacterNotFound(character_id))?;

        let story = self
            .store
            .insert_story(&Story::new(character_id, title, content))?;

        if let Err(e) = self.pipeline.queue(story.id) {
            warn!(
                story_id = story.id,
                error = %e,
                "Embedding backlog full; story created without embedding"
            );
        }

        debug!(story_id = story.id, character_id, "Story created");
        Ok(story)
    }

    /// Re-queue a story for embedding (operator action).
    ///
    /// A fresh vector overwrites any existing one when the job completes.
    /// Unlike creation, a full backlog is surfaced here so the operator can
    /// retry.
    pub fn embed_story(&self, story_id: Id) -> Result<()> {
        if !self.store.story_exists(story_id)? {
            return Err(ChatError::StoryNotFound(story_id));
        }
        self.pipeline.queue(story_id)
    }

    /// The `limit` stories under a character most similar to the query text.
    ///
    /// The query is embedded first; if that call fails the search fails
    /// closed — a distance ordering without a valid query vector would be
    /// meaningless.
    pub async fn search_similar(
        &self,
        query: &str,
        character_id: Id,
        limit: usize,
    ) -> Result<Vec<SimilarStory>> {
        let vector = self.inference.embed(query).await?;
        Ok(self
            .store
            .find_similar_stories(character_id, &vector, limit)?)
    }

    /// Get a story by id.
    pub fn find_story(&self, story_id: Id) -> Result<Story> {
        self.store
            .find_story_by_id(story_id)?
            .ok_or(ChatError::StoryNotFound(story_id))
    }

    /// All stories for a character, newest first.
    pub fn stories_for_character(&self, character_id: Id) -> Result<Vec<Story>> {
        Ok(self.store.find_stories_by_character(character_id)?)
    }

    /// Stories still awaiting an embedding.
    pub fn stories_without_embedding(&self) -> Result<Vec<Story>> {
        Ok(self.store.find_stories_without_embedding()?)
    }

    /// Delete a story.
    pub fn delete_story(&self, story_id: Id) -> Result<()> {
        if !self.store.delete_story(story_id)? {
            return Err(ChatError::StoryNotFound(story_id));
        }
        Ok(())
    }

    /// Embedding pipeline counters.
    pub fn pipeline_stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use reverie_inference::MockInference;
    use reverie_types::Character;

    fn service_with(inference: Arc<MockInference>) -> (StoryService, Arc<RecordStore>, Id) {
        let store = Arc::new(RecordStore::open_in_memory().unwrap());
        let character_id = store
            .insert_character(&Character::new("Nova", 23))
            .unwrap()
            .id;
        let shared: SharedInference = inference;
        let pipeline = EmbeddingPipeline::spawn(Arc::clone(&store), shared.clone(), 16);
        (
            StoryService::new(Arc::clone(&store), shared, pipeline),
            store,
            character_id,
        )
    }

    async fn wait_for_embedding(store: &RecordStore, story_id: Id) {
        for _ in 0..100 {
            if store
                .find_story_by_id(story_id)
                .unwrap()
                .unwrap()
                .has_embedding()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("story {} never embedded", story_id);
    }

    #[tokio::test]
    async fn test_create_story_embeds_eventually() {
        let (service, store, character_id) = service_with(Arc::new(MockInference::new(8)));

        let story = service
            .create_story(character_id, "Origin", "once upon a time")
            .await
            .unwrap();

        // Creation returned before the embedding landed.
        assert!(!story.has_embedding());

        wait_for_embedding(&store, story.id).await;
        assert!(service.stories_without_embedding().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_story_unknown_character() {
        let (service, _, _) = service_with(Arc::new(MockInference::new(8)));

        let result = service.create_story(9999, "t", "c").await;
        assert!(matches!(result, Err(ChatError::CharacterNotFound(9999))));
    }

    #[tokio::test]
    async fn test_embed_story_overwrites_existing_vector() {
        let (service, store, character_id) = service_with(Arc::new(MockInference::new(8)));

        let story = service
            .create_story(character_id, "Origin", "once upon a time")
            .await
            .unwrap();
        wait_for_embedding(&store, story.id).await;

        // Plant a junk vector, then re-embed: the fresh vector must win.
        store.set_story_embedding(story.id, &[9.0; 8]).unwrap();
        service.embed_story(story.id).unwrap();

        for _ in 0..100 {
            let current = store
                .find_story_by_id(story.id)
                .unwrap()
                .unwrap()
                .embedding
                .unwrap();
            if current != vec![9.0; 8] {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("re-embed never overwrote the vector");
    }

    #[tokio::test]
    async fn test_embed_story_unknown_id() {
        let (service, _, _) = service_with(Arc::new(MockInference::new(8)));

        let result = service.embed_story(4242);
        assert!(matches!(result, Err(ChatError::StoryNotFound(4242))));
    }

    #[tokio::test]
    async fn test_search_similar_ranks_by_content() {
        let (service, store, character_id) = service_with(Arc::new(MockInference::new(8)));

        let matching = service
            .create_story(character_id, "Magic", "magic")
            .await
            .unwrap();
        let other = service
            .create_story(character_id, "Weather", "a very different topic entirely")
            .await
            .unwrap();
        wait_for_embedding(&store, matching.id).await;
        wait_for_embedding(&store, other.id).await;

        // The mock embeds identical text identically, so the story whose
        // content equals the query is at distance zero.
        let results = service.search_similar("magic", character_id, 3).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].story.id, matching.id);
        assert!(results[0].distance < 0.001);
        assert!(results[0].distance < results[1].distance);
    }

    #[tokio::test]
    async fn test_search_fails_closed_when_query_embed_fails() {
        let (service, store, character_id) =
            service_with(Arc::new(MockInference::new(8).failing_embeds()));

        // A story exists (embedded by hand since the pipeline mock fails).
        let story = store
            .insert_story(&Story::new(character_id, "s", "x"))
            .unwrap();
        store.set_story_embedding(story.id, &[0.0; 8]).unwrap();

        let result = service.search_similar("magic", character_id, 3).await;
        assert!(matches!(result, Err(ChatError::Inference(_))));
    }

    #[tokio::test]
    async fn test_delete_and_find() {
        let (service, _, character_id) = service_with(Arc::new(MockInference::new(8)));

        let story = service
            .create_story(character_id, "Origin", "text")
            .await
            .unwrap();

        assert_eq!(service.find_story(story.id).unwrap().id, story.id);
        assert_eq!(service.stories_for_character(character_id).unwrap().len(), 1);

        service.delete_story(story.id).unwrap();
        assert!(matches!(
            service.find_story(story.id),
            Err(ChatError::StoryNotFound(_))
        ));
        assert!(matches!(
            service.delete_story(story.id),
            Err(ChatError::StoryNotFound(_))
        ));
    }
}
