//! Recipe storage subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → RecipeStore trait (backend-agnostic contract)
//!     → memory.rs  (process memory, RwLock-guarded)
//!     → file.rs    (memory + flat JSON file rewritten on mutation)
//!     → sqlite.rs  (embedded database, one row per recipe)
//! ```
//!
//! # Design Decisions
//! - Handlers only see `Arc<dyn RecipeStore>`; the backend is picked at startup
//! - Ids are generated by the store, never by the caller
//! - Empty collections are successful results, not errors

pub mod file;
pub mod memory;
pub mod sqlite;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{Recipe, RecipeInput};

/// Errors returned by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No recipe with the given id.
    #[error("recipe {0} not found")]
    NotFound(String),

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding persisted JSON failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The embedded database reported an error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Persisted data violates a store invariant.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// The backend could not run the operation at all.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract shared by every backend.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Assign an id and timestamp, persist, and return the new record.
    async fn insert(&self, input: RecipeInput) -> StoreResult<Recipe>;

    /// All records in insertion order.
    async fn find_all(&self) -> StoreResult<Vec<Recipe>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Recipe>;

    /// Overwrite the mutable fields of an existing record.
    async fn update_by_id(&self, id: &str, input: RecipeInput) -> StoreResult<Recipe>;

    /// Remove a record, returning what was removed.
    async fn delete_by_id(&self, id: &str) -> StoreResult<Recipe>;

    /// Records carrying `tag`, compared case-insensitively.
    async fn find_by_tag(&self, tag: &str) -> StoreResult<Vec<Recipe>>;

    async fn count(&self) -> StoreResult<usize>;
}
