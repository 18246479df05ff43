//! Story persistence, embedding updates, and similarity queries.

use rusqlite::params;
use tracing::debug;

use reverie_types::{Id, Story};

use super::{RecordStore, parse_timestamp};
use crate::error::Result;
use crate::vector::{decode_embedding, encode_embedding, euclidean_distance};

/// A story paired with its distance from a query vector.
#[derive(Debug, Clone)]
pub struct SimilarStory {
    pub story: Story,
    /// Euclidean distance to the query (lower = more similar).
    pub distance: f32,
}

impl RecordStore {
    /// Insert a new story, returning it with its assigned id.
    pub fn insert_story(&self, story: &Story) -> Result<Story> {
        let conn = self.conn.lock().unwrap();

        let embedding_blob = story.embedding.as_deref().map(encode_embedding);

        conn.execute(
            r#"
            INSERT INTO stories (character_id, title, content, embedding, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                story.character_id,
                story.title,
                story.content,
                embedding_blob,
                story.created_at.to_rfc3339(),
                story.updated_at.to_rfc3339(),
            ],
        )?;

        let mut stored = story.clone();
        stored.id = conn.last_insert_rowid();

        debug!(story_id = stored.id, character_id = stored.character_id, "Inserted story");
        Ok(stored)
    }

    /// Get a story by id.
    pub fn find_story_by_id(&self, id: Id) -> Result<Option<Story>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, character_id, title, content, embedding, created_at, updated_at
            FROM stories
            WHERE id = ?1
            "#,
        )?;
        let mut rows = stmt.query(params![id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_story(row)?))
        } else {
            Ok(None)
        }
    }

    /// All stories for a character, newest first.
    pub fn find_stories_by_character(&self, character_id: Id) -> Result<Vec<Story>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, character_id, title, content, embedding, created_at, updated_at
            FROM stories
            WHERE character_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let mut rows = stmt.query(params![character_id])?;

        let mut stories = Vec::new();
        while let Some(row) = rows.next()? {
            stories.push(Self::row_to_story(row)?);
        }
        Ok(stories)
    }

    /// Stories with no embedding yet, across all characters.
    ///
    /// These are the candidates for (re)embedding.
    pub fn find_stories_without_embedding(&self) -> Result<Vec<Story>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, character_id, title, content, embedding, created_at, updated_at
            FROM stories
            WHERE embedding IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )?;
        let mut rows = stmt.query([])?;

        let mut stories = Vec::new();
        while let Some(row) = rows.next()? {
            stories.push(Self::row_to_story(row)?);
        }
        Ok(stories)
    }

    /// Write an embedding vector onto an existing story.
    ///
    /// A single UPDATE: concurrent writers leave either the old or the new
    /// vector, never a torn one. Returns `false` if the story is gone.
    pub fn set_story_embedding(&self, id: Id, embedding: &[f32]) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn.execute(
            "UPDATE stories SET embedding = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                id,
                encode_embedding(embedding),
                reverie_types::now().to_rfc3339(),
            ],
        )?;

        debug!(story_id = id, dimensions = embedding.len(), "Stored story embedding");
        Ok(rows_affected > 0)
    }

    /// The `limit` embedded stories under a character nearest to the query
    /// vector, ascending distance.
    ///
    /// Stories without an embedding are excluded; stored vectors whose length
    /// differs from the query's are skipped.
    pub fn find_similar_stories(
        &self,
        character_id: Id,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilarStory>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, character_id, title, content, embedding, created_at, updated_at
            FROM stories
            WHERE character_id = ?1 AND embedding IS NOT NULL
            "#,
        )?;
        let mut rows = stmt.query(params![character_id])?;

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let story = Self::row_to_story(row)?;
            let Some(embedding) = story.embedding.as_deref() else {
                continue;
            };
            if embedding.len() != query.len() {
                continue;
            }
            let distance = euclidean_distance(embedding, query);
            results.push(SimilarStory { story, distance });
        }

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(limit);

        debug!(
            character_id,
            found = results.len(),
            limit,
            "Similarity search complete"
        );
        Ok(results)
    }

    /// Delete a story by id.
    pub fn delete_story(&self, id: Id) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn.execute("DELETE FROM stories WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    /// Whether a story exists.
    pub fn story_exists(&self, id: Id) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM stories WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn row_to_story(row: &rusqlite::Row<'_>) -> Result<Story> {
        let embedding_blob: Option<Vec<u8>> = row.get(4)?;
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;

        Ok(Story {
            id: row.get(0)?,
            character_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            embedding: embedding_blob
                .as_deref()
                .map(decode_embedding)
                .transpose()?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_types::Character;

    fn seed_character(store: &RecordStore) -> Id {
        store
            .insert_character(&Character::new("Nova", 23))
            .unwrap()
            .id
    }

    #[test]
    fn test_insert_and_find() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);

        let story = store
            .insert_story(&Story::new(character_id, "Origin", "once upon a time"))
            .unwrap();
        assert!(story.id > 0);

        let found = store.find_story_by_id(story.id).unwrap().unwrap();
        assert_eq!(found.title, "Origin");
        assert!(!found.has_embedding());
    }

    #[test]
    fn test_set_embedding_roundtrip() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);

        let story = store
            .insert_story(&Story::new(character_id, "Origin", "text"))
            .unwrap();

        let vector = vec![0.25f32, -1.5, 3.0];
        assert!(store.set_story_embedding(story.id, &vector).unwrap());

        let found = store.find_story_by_id(story.id).unwrap().unwrap();
        assert!(found.has_embedding());
        assert_eq!(found.embedding.unwrap(), vector);

        // Missing story reports false instead of writing.
        assert!(!store.set_story_embedding(9999, &vector).unwrap());
    }

    #[test]
    fn test_set_embedding_overwrites() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);

        let story = store
            .insert_story(&Story::new(character_id, "Origin", "text"))
            .unwrap();

        store.set_story_embedding(story.id, &[1.0, 0.0]).unwrap();
        store.set_story_embedding(story.id, &[0.0, 1.0]).unwrap();

        let found = store.find_story_by_id(story.id).unwrap().unwrap();
        assert_eq!(found.embedding.unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_find_without_embedding() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);

        let pending = store
            .insert_story(&Story::new(character_id, "Pending", "text"))
            .unwrap();
        let embedded = store
            .insert_story(&Story::new(character_id, "Done", "text"))
            .unwrap();
        store.set_story_embedding(embedded.id, &[0.1]).unwrap();

        let without = store.find_stories_without_embedding().unwrap();
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].id, pending.id);
    }

    #[test]
    fn test_similarity_search_orders_by_distance() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);

        let near = store
            .insert_story(&Story::new(character_id, "Near", "a"))
            .unwrap();
        let close = store
            .insert_story(&Story::new(character_id, "Close", "b"))
            .unwrap();
        let far = store
            .insert_story(&Story::new(character_id, "Far", "c"))
            .unwrap();
        let unembedded = store
            .insert_story(&Story::new(character_id, "Skip", "d"))
            .unwrap();

        store.set_story_embedding(near.id, &[1.0, 0.0, 0.0]).unwrap();
        store.set_story_embedding(close.id, &[0.9, 0.1, 0.0]).unwrap();
        store.set_story_embedding(far.id, &[0.0, 0.0, 1.0]).unwrap();

        let results = store
            .find_similar_stories(character_id, &[1.0, 0.0, 0.0], 10)
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].story.id, near.id);
        assert!(results[0].distance < 0.01);
        assert_eq!(results[1].story.id, close.id);
        assert_eq!(results[2].story.id, far.id);
        assert!(results.iter().all(|r| r.story.id != unembedded.id));
    }

    #[test]
    fn test_similarity_search_respects_limit_and_character() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);
        let other_id = store
            .insert_character(&Character::new("Shinobu", 19))
            .unwrap()
            .id;

        for i in 0..4 {
            let story = store
                .insert_story(&Story::new(character_id, format!("s{}", i), "x"))
                .unwrap();
            store
                .set_story_embedding(story.id, &[i as f32, 0.0])
                .unwrap();
        }
        let foreign = store
            .insert_story(&Story::new(other_id, "other", "x"))
            .unwrap();
        store.set_story_embedding(foreign.id, &[0.0, 0.0]).unwrap();

        let results = store
            .find_similar_stories(character_id, &[0.0, 0.0], 2)
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.story.character_id == character_id));
    }

    #[test]
    fn test_similarity_search_skips_mismatched_dimensions() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);

        let story = store
            .insert_story(&Story::new(character_id, "s", "x"))
            .unwrap();
        store.set_story_embedding(story.id, &[1.0, 0.0, 0.0]).unwrap();

        let results = store
            .find_similar_stories(character_id, &[1.0, 0.0], 10)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_delete_and_exists() {
        let store = RecordStore::open_in_memory().unwrap();
        let character_id = seed_character(&store);

        let story = store
            .insert_story(&Story::new(character_id, "s", "x"))
            .unwrap();
        assert!(store.story_exists(story.id).unwrap());
        assert!(store.delete_story(story.id).unwrap());
        assert!(!store.story_exists(story.id).unwrap());
    }
}
