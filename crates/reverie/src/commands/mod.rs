//! CLI command implementations.

pub mod embed_pending;
pub mod seed;
pub mod serve;
