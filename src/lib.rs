//! Quiz session engine: working-set selection, difficulty ranking over
//! answer history, and a resumable play-through state machine. Storage
//! and UI stay behind the narrow interfaces in [`store`].

pub mod engine;
pub mod error;
pub mod models;
pub mod names;
pub mod ranker;
pub mod scheduler;
pub mod selector;
pub mod store;

pub use engine::{AnswerOutcome, EngineState, PersistWarning, SessionEngine};
pub use error::{EngineError, StoreError};
pub use models::{
    Answer, AttemptRecord, CategoryStats, Item, ItemKind, QuizSetDefinition, SessionSnapshot,
    SnapshotItems,
};
pub use selector::SelectionRequest;
