// Store interfaces - the engine's only view of persistence.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{AttemptRecord, Item, QuizSetDefinition, SessionSnapshot};

pub mod memory;
pub use memory::{MemoryCatalog, MemoryHistory, MemorySessions};

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only access to the universe of quiz items and quiz-set groupings.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn get_all_items(&self) -> StoreResult<Vec<Item>>;

    /// Items for the given ids, in the requested order. Ids unknown to the
    /// catalog are omitted from the result.
    async fn get_items_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Item>>;

    async fn get_quiz_set(&self, id: &str) -> StoreResult<Option<QuizSetDefinition>>;

    /// Whether item ids survive catalog edits. Drives the choice between
    /// persisting item refs and embedding full items in snapshots.
    fn has_stable_ids(&self) -> bool {
        false
    }
}

/// Append-only record of answer attempts. The one source of truth for
/// difficulty ranking.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append_attempt(&self, record: AttemptRecord) -> StoreResult<()>;

    /// The full history in insertion order; the engine filters in memory.
    /// Insertion order is what breaks equal-timestamp ties downstream.
    async fn get_all_attempts(&self) -> StoreResult<Vec<AttemptRecord>>;
}

/// Durable key-value store for session snapshots, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Option<SessionSnapshot>>;

    /// Insert or overwrite a snapshot under its id.
    async fn put(&self, snapshot: &SessionSnapshot) -> StoreResult<()>;

    /// Deleting a missing id is not an error.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    async fn list_by_completion(&self, is_completed: bool) -> StoreResult<Vec<SessionSnapshot>>;
}
