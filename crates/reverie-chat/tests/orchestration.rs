//! End-to-end orchestration properties across the domain layer.

use std::sync::Arc;
use std::time::Duration;

use reverie_chat::{ChatService, EmbeddingPipeline, StoryService};
use reverie_inference::{Inference, MockInference, SharedInference};
use reverie_store::RecordStore;
use reverie_types::{Character, Id, MessageType, User};

fn seed(store: &RecordStore) -> (Id, Id) {
    let user = store.insert_user(&User::new("alice")).unwrap();
    let character = store
        .insert_character(&Character::new("Nova", 23).with_personality("Warm"))
        .unwrap();
    (user.id, character.id)
}

/// Persisted turns under a session alternate USER/AI, except that a failed
/// reply leaves a USER turn with no AI follow-up.
#[tokio::test]
async fn session_sequence_alternates_with_failure_gaps() {
    let store = Arc::new(RecordStore::open_in_memory().unwrap());
    let (_, character_id) = seed(&store);

    let healthy = ChatService::new(Arc::clone(&store), Arc::new(MockInference::new(4)));
    let broken = ChatService::new(
        Arc::clone(&store),
        Arc::new(MockInference::new(4).failing()),
    );

    let first = healthy
        .send_message("alice", character_id, "one", None)
        .await
        .unwrap();
    let session = first.session_id.unwrap();

    // A failed exchange in the middle, then a successful one.
    let failed = broken
        .send_message("alice", character_id, "two", Some(session.clone()))
        .await
        .unwrap();
    assert!(!failed.success);

    healthy
        .send_message("alice", character_id, "three", Some(session.clone()))
        .await
        .unwrap();

    let kinds: Vec<MessageType> = store
        .find_by_session(&session)
        .unwrap()
        .iter()
        .map(|m| m.message_type)
        .collect();

    assert_eq!(
        kinds,
        vec![
            MessageType::User,
            MessageType::Ai,
            MessageType::User, // the failed turn: no AI follow-up
            MessageType::User,
            MessageType::Ai,
        ]
    );

    // Never two consecutive AI turns.
    assert!(
        kinds
            .windows(2)
            .all(|w| !(w[0] == MessageType::Ai && w[1] == MessageType::Ai))
    );
}

/// The same (user, character) pair may be processed concurrently; every
/// exchange lands both its turns and nothing is lost.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_on_same_pair_all_persist() {
    let store = Arc::new(RecordStore::open_in_memory().unwrap());
    let (user_id, character_id) = seed(&store);
    let chat = ChatService::new(Arc::clone(&store), Arc::new(MockInference::new(4)));

    let mut handles = Vec::new();
    for i in 0..8 {
        let chat = chat.clone();
        handles.push(tokio::spawn(async move {
            chat.send_message("alice", character_id, &format!("m{}", i), None)
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        let reply = handle.await.unwrap();
        assert!(reply.success);
    }

    assert_eq!(
        store.count_conversation(user_id, character_id).unwrap(),
        16
    );

    let history = chat
        .conversation_history(user_id, character_id, 100)
        .await
        .unwrap();
    assert_eq!(history.len(), 16);
}

/// Concurrent embeds of one story never corrupt the stored vector: whatever
/// lands last is a complete, decodable embedding.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_embeds_leave_valid_vector() {
    let store = Arc::new(RecordStore::open_in_memory().unwrap());
    let (_, character_id) = seed(&store);

    let inference: SharedInference = Arc::new(MockInference::new(8));
    let pipeline = EmbeddingPipeline::spawn(Arc::clone(&store), inference.clone(), 32);
    let stories = StoryService::new(Arc::clone(&store), inference.clone(), pipeline);

    let story = stories
        .create_story(character_id, "Origin", "once upon a time")
        .await
        .unwrap();

    for _ in 0..8 {
        // Backlog is wide enough that these all queue.
        stories.embed_story(story.id).unwrap();
    }

    let expected = inference.embed("once upon a time").await.unwrap();
    for _ in 0..100 {
        let stats = stories.pipeline_stats();
        if stats.queued == 0 && stats.completed >= 9 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let stored = store
        .find_story_by_id(story.id)
        .unwrap()
        .unwrap()
        .embedding
        .unwrap();
    assert_eq!(stored, expected);
}
