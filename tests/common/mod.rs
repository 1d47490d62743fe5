#![allow(dead_code)] // each test binary uses a different subset of helpers

use chrono::{TimeZone, Utc};
use quizcore::models::{Answer, AttemptRecord, Item, ItemKind, QuizSetDefinition};
use quizcore::store::{MemoryCatalog, MemoryHistory, MemorySessions};
use quizcore::SessionEngine;

pub type TestEngine = SessionEngine<MemoryCatalog, MemoryHistory, MemorySessions>;

/// Mirror the application's subscriber setup so `RUST_LOG` works in tests.
pub fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "quizcore=debug".to_owned());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn tf_item(id: &str, category: &str, correct: bool) -> Item {
    Item {
        id: id.to_string(),
        category: Some(category.to_string()),
        kind: ItemKind::TrueFalse { correct },
    }
}

pub fn mc_item(id: &str, category: &str, correct_index: usize) -> Item {
    Item {
        id: id.to_string(),
        category: Some(category.to_string()),
        kind: ItemKind::MultipleChoice {
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_index,
        },
    }
}

/// True/false items `item-1..item-n`, all with `correct = true`, cycling
/// through three categories.
pub fn make_items(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| tf_item(&format!("item-{}", i + 1), &format!("Category {}", i % 3), true))
        .collect()
}

pub fn attempt(item_id: &str, is_correct: bool, at_secs: i64) -> AttemptRecord {
    AttemptRecord {
        item_id: item_id.to_string(),
        category: None,
        is_correct,
        submitted: Answer::Bool(is_correct),
        timestamp: Utc.timestamp_opt(at_secs, 0).unwrap(),
    }
}

pub fn quiz_set(id: &str, name: &str, item_ids: &[&str]) -> QuizSetDefinition {
    QuizSetDefinition {
        id: id.to_string(),
        name: name.to_string(),
        item_ids: item_ids.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn stores(items: Vec<Item>) -> (MemoryCatalog, MemoryHistory, MemorySessions) {
    (MemoryCatalog::new(items), MemoryHistory::new(), MemorySessions::new())
}

/// Engine over clones of the given store handles, so tests keep shared
/// access to the underlying state.
pub fn engine(
    catalog: &MemoryCatalog,
    history: &MemoryHistory,
    sessions: &MemorySessions,
) -> TestEngine {
    SessionEngine::new(catalog.clone(), history.clone(), sessions.clone())
}
