//! Durable record store for the Reverie chat service.
//!
//! SQLite-backed persistence for users, characters, chat messages, and
//! stories. The store is the system of record for all durable state; the
//! conversation cache upstream is a disposable projection of it.

mod error;
mod store;
pub mod vector;

pub use error::{Result, StoreError};
pub use store::{RecordStore, SimilarStory, StoreStats};
