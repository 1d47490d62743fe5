// Set selection: turns a requested play mode into the shuffled working
// set of items a session steps through.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::Item;
use crate::names;
use crate::ranker;
use crate::store::{HistoryStore, ItemCatalog};

/// A requested play mode with its parameters. Persisted in the snapshot
/// so a resumed session remembers where its working set came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionRequest {
    /// The full catalog.
    AllItems,
    /// Items in one category, optionally restricted to a quiz-set first.
    ByCategory {
        category: String,
        quiz_set: Option<String>,
    },
    /// The items a quiz-set references.
    ByQuizSet { quiz_set_id: String },
    /// Items the history marks for review, optionally scoped to a quiz-set.
    IncorrectOnly {
        quiz_set: Option<String>,
        latest_only: bool,
    },
    /// The `count` historically hardest items of a quiz-set.
    WorstN {
        quiz_set_id: String,
        count: usize,
        latest_only: bool,
    },
}

impl SelectionRequest {
    /// Worst-problems review with the default item count.
    pub fn worst_of(quiz_set_id: impl Into<String>, latest_only: bool) -> Self {
        SelectionRequest::WorstN {
            quiz_set_id: quiz_set_id.into(),
            count: names::DEFAULT_WORST_COUNT,
            latest_only,
        }
    }
}

/// Build the working set for a request: mode-specific candidates, deduped
/// by id keeping the first occurrence, then uniformly shuffled. Fails
/// with `EmptySelection` when nothing matches; a missing quiz-set id is
/// an empty selection, not a distinct error.
pub async fn select_items<C, H>(
    catalog: &C,
    history: &H,
    request: &SelectionRequest,
    rng: &mut StdRng,
) -> Result<Vec<Item>, EngineError>
where
    C: ItemCatalog,
    H: HistoryStore,
{
    let candidates = match request {
        SelectionRequest::AllItems => catalog.get_all_items().await?,
        SelectionRequest::ByCategory { category, quiz_set } => {
            let pool = scoped_items(catalog, quiz_set.as_deref()).await?;
            pool.into_iter()
                .filter(|item| item.category.as_deref() == Some(category.as_str()))
                .collect()
        }
        SelectionRequest::ByQuizSet { quiz_set_id } => quiz_set_items(catalog, quiz_set_id).await?,
        SelectionRequest::IncorrectOnly {
            quiz_set,
            latest_only,
        } => {
            let pool = scoped_items(catalog, quiz_set.as_deref()).await?;
            let ids: Vec<String> = pool.iter().map(|item| item.id.clone()).collect();
            let attempts = history.get_all_attempts().await?;
            let keep: HashSet<String> = ranker::incorrect_item_ids(&attempts, &ids, *latest_only)
                .into_iter()
                .collect();
            pool.into_iter()
                .filter(|item| keep.contains(&item.id))
                .collect()
        }
        SelectionRequest::WorstN {
            quiz_set_id,
            count,
            latest_only,
        } => {
            let pool = quiz_set_items(catalog, quiz_set_id).await?;
            let mut seen = HashSet::new();
            let ids: Vec<String> = pool
                .iter()
                .map(|item| item.id.clone())
                .filter(|id| seen.insert(id.clone()))
                .collect();
            let attempts = history.get_all_attempts().await?;
            let ranked = ranker::worst_n(&attempts, &ids, *count, *latest_only);
            let mut by_id: HashMap<String, Item> = pool
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect();
            ranked
                .iter()
                .filter_map(|id| by_id.remove(id))
                .collect()
        }
    };

    // Defensive: a well-formed catalog should not produce duplicates.
    let mut seen = HashSet::new();
    let mut items: Vec<Item> = candidates
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    if items.is_empty() {
        return Err(EngineError::EmptySelection);
    }

    items.shuffle(rng);
    Ok(items)
}

async fn scoped_items<C: ItemCatalog>(
    catalog: &C,
    quiz_set: Option<&str>,
) -> Result<Vec<Item>, EngineError> {
    match quiz_set {
        Some(id) => quiz_set_items(catalog, id).await,
        None => Ok(catalog.get_all_items().await?),
    }
}

async fn quiz_set_items<C: ItemCatalog>(
    catalog: &C,
    quiz_set_id: &str,
) -> Result<Vec<Item>, EngineError> {
    let Some(quiz_set) = catalog.get_quiz_set(quiz_set_id).await? else {
        return Ok(Vec::new());
    };
    Ok(catalog.get_items_by_ids(&quiz_set.item_ids).await?)
}
