//! Recipe record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of generated short ids.
pub const SHORT_ID_LEN: usize = 20;

const SHORT_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuv";

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Store-assigned identifier. Missing ids are tolerated only when loading
    /// a recipes file; the file store assigns one on load.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Creation time, never changed after insert.
    pub published_at: DateTime<Utc>,
}

impl Recipe {
    /// Build a new record from caller input.
    pub fn new(id: String, input: RecipeInput, published_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            tags: input.tags,
            ingredients: input.ingredients,
            instructions: input.instructions,
            published_at,
        }
    }

    /// Overwrite the mutable fields. `id` and `published_at` stay untouched.
    pub fn apply(&mut self, input: RecipeInput) {
        self.name = input.name;
        self.tags = input.tags;
        self.ingredients = input.ingredients;
        self.instructions = input.instructions;
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}

/// Payload accepted by create and update.
///
/// Unknown fields (including `id` and `publishedAt`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Generate a random short id from a lowercase base32 alphabet.
pub fn short_id() -> String {
    (0..SHORT_ID_LEN)
        .map(|_| SHORT_ID_ALPHABET[fastrand::usize(..SHORT_ID_ALPHABET.len())] as char)
        .collect()
}
