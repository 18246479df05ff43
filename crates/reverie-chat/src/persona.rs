//! Character name to persona handle resolution.
//!
//! The inference service selects a persona template by handle. Known
//! characters map through an explicit table; anything else falls through a
//! pure slugify rule, so new characters are table entries, not code changes.

use std::collections::HashMap;

/// Resolves a character's display name to its server-side persona handle.
#[derive(Debug, Clone)]
pub struct PersonaResolver {
    table: HashMap<String, String>,
}

impl PersonaResolver {
    /// Create an empty resolver (fallback rule only).
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add a name → handle mapping.
    pub fn with_entry(mut self, name: impl Into<String>, handle: impl Into<String>) -> Self {
        self.table.insert(name.into(), handle.into());
        self
    }

    /// Resolve a character name to a persona handle.
    pub fn resolve(&self, name: &str) -> String {
        self.table
            .get(name)
            .cloned()
            .unwrap_or_else(|| fallback_handle(name))
    }
}

impl Default for PersonaResolver {
    fn default() -> Self {
        Self::empty()
            .with_entry("Hoshino Ai", "hoshino ai_character.txt")
            .with_entry("Shinobu", "shinobu_character.txt")
    }
}

/// Slugify rule for names not present in the table.
pub fn fallback_handle(name: &str) -> String {
    format!("{}_character.txt", name.to_lowercase().replace(' ', "_"))
}
