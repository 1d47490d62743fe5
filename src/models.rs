// Domain model structs shared across the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::names;
use crate::selector::SelectionRequest;

/// A single quiz item with a known correct answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub category: Option<String>,
    pub kind: ItemKind,
}

impl Item {
    /// Catalog invariant: multiple-choice items carry at least
    /// `names::MIN_OPTION_COUNT` options and a valid correct index.
    pub fn is_well_formed(&self) -> bool {
        match &self.kind {
            ItemKind::TrueFalse { .. } => true,
            ItemKind::MultipleChoice {
                options,
                correct_index,
            } => options.len() >= names::MIN_OPTION_COUNT && *correct_index < options.len(),
        }
    }
}

/// Question shape. The correct answer lives with the variant, so a
/// true/false item always has its boolean and a multiple-choice item
/// always has options plus the correct index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    TrueFalse {
        correct: bool,
    },
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
}

/// A submitted answer, aligned with the item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Bool(bool),
    Choice(usize),
}

/// A named, ordered collection of item ids curated by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSetDefinition {
    pub id: String,
    pub name: String,
    pub item_ids: Vec<String>,
}

/// Per-category accuracy derived from attempt history. Accuracy is a
/// percentage rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// One historical answer attempt. Append-only; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub item_id: String,
    pub category: Option<String>,
    pub is_correct: bool,
    pub submitted: Answer,
    pub timestamp: DateTime<Utc>,
}

/// How a snapshot persists its working set. Catalogs with stable ids keep
/// only the play-order ids; otherwise full items are embedded so the
/// session survives catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotItems {
    Refs(Vec<String>),
    Embedded(Vec<Item>),
}

impl SnapshotItems {
    pub fn len(&self) -> usize {
        match self {
            SnapshotItems::Refs(ids) => ids.len(),
            SnapshotItems::Embedded(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single resumable play-through: an ordered working set, a cursor into
/// it, a running score, and the answers recorded so far.
///
/// Invariants: `cursor <= items.len()`, `answers.len() == cursor`,
/// `score <= cursor`, and a completed snapshot has `cursor == items.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub source: SelectionRequest,
    pub items: SnapshotItems,
    pub shuffle_seed: u64,
    pub cursor: usize,
    pub score: usize,
    pub answers: Vec<Answer>,
    pub started_at: DateTime<Utc>,
    pub is_completed: bool,
    pub is_paused: bool,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
