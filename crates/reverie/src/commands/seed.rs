//! `reverie seed` - create demo user and sample characters.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use reverie_store::RecordStore;
use reverie_types::{Character, User};

#[derive(Args)]
pub struct SeedArgs {
    /// Path to the SQLite database
    #[arg(long, env = "REVERIE_DB", default_value = "reverie.db")]
    pub db: PathBuf,
}

pub fn run(args: SeedArgs) -> Result<()> {
    let store = RecordStore::open(&args.db)?;

    if store.find_user_by_username("demo")?.is_none() {
        let user = store.insert_user(&User::new("demo").with_email("demo@example.com"))?;
        info!(user_id = user.id, "Created demo user");
    } else {
        info!("Demo user already exists, skipping");
    }

    for character in sample_characters() {
        if store.find_character_by_name(&character.name)?.is_some() {
            info!(name = %character.name, "Character already exists, skipping");
            continue;
        }
        let stored = store.insert_character(&character)?;
        info!(character_id = stored.id, name = %stored.name, "Created character");
    }

    Ok(())
}

fn sample_characters() -> Vec<Character> {
    vec![
        Character::new("Nova", 23)
            .with_description("A wandering astronomer who reads fortunes in the stars")
            .with_personality("Warm, curious, a little dreamy")
            .with_speaking_style("Soft-spoken, fond of celestial metaphors")
            .with_occupation("Astronomer")
            .with_background("Grew up in a mountain observatory and never stopped looking up"),
        Character::new("Shinobu", 19)
            .with_description("A quiet swordswoman studying at a city dojo")
            .with_personality("Reserved, dry-humored, fiercely loyal")
            .with_speaking_style("Short sentences, deadpan delivery")
            .with_occupation("Student"),
    ]
}
