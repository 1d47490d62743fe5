// Error types for the engine and its store collaborators.

use thiserror::Error;

use crate::engine::EngineState;

/// Failures reported by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record '{0}' not found")]
    NotFound(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Engine-level failures surfaced to the embedding UI.
///
/// `EmptySelection` and `SessionNotFound` are recoverable: the user picks
/// a different mode or session. `PersistenceWriteFailed` during an active
/// session never unwinds in-memory state. `InvalidSessionState` is a
/// caller bug, not a quiz-logic case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("selection produced no items")]
    EmptySelection,
    #[error("session '{0}' not found")]
    SessionNotFound(String),
    #[error("persistence failed: {0}")]
    PersistenceWriteFailed(#[from] StoreError),
    #[error("operation not valid while {0:?}")]
    InvalidSessionState(EngineState),
}
