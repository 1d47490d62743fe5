// Difficulty ranking over attempt history. Pure functions: the stores
// hand over the full history and everything is filtered in memory.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::models::{AttemptRecord, CategoryStats};
use crate::names;

/// Most recent correctness per item, by timestamp descending. Later
/// records win equal-timestamp ties, so the history's insertion order is
/// the tie-breaker. Items with no attempts are absent from the map.
pub fn latest_correctness(attempts: &[AttemptRecord]) -> HashMap<String, bool> {
    let mut latest: HashMap<&str, (DateTime<Utc>, bool)> = HashMap::new();
    for attempt in attempts {
        match latest.get(attempt.item_id.as_str()) {
            Some((timestamp, _)) if attempt.timestamp < *timestamp => {}
            _ => {
                latest.insert(attempt.item_id.as_str(), (attempt.timestamp, attempt.is_correct));
            }
        }
    }
    latest
        .into_iter()
        .map(|(id, (_, is_correct))| (id.to_owned(), is_correct))
        .collect()
}

/// Aggregate correctness ratio (correct / total) per attempted item.
pub fn aggregate_ratios(attempts: &[AttemptRecord]) -> HashMap<String, f64> {
    let mut tallies: HashMap<&str, (u32, u32)> = HashMap::new();
    for attempt in attempts {
        let (correct, total) = tallies.entry(attempt.item_id.as_str()).or_insert((0, 0));
        *total += 1;
        if attempt.is_correct {
            *correct += 1;
        }
    }
    tallies
        .into_iter()
        .map(|(id, (correct, total))| (id.to_owned(), f64::from(correct) / f64::from(total)))
        .collect()
}

/// "Worst first" ranking of the candidates, at most `n` items.
///
/// With `latest_only` each candidate scores 0.0 or 1.0 by its most recent
/// attempt and untried candidates are excluded outright; otherwise the
/// score is the aggregate ratio, with untried candidates defaulting to
/// `names::UNTRIED_RATIO`. The sort is stable, so equal scores keep the
/// candidates' catalog order.
pub fn worst_n(
    attempts: &[AttemptRecord],
    candidates: &[String],
    n: usize,
    latest_only: bool,
) -> Vec<String> {
    let mut scored: Vec<(&String, f64)> = if latest_only {
        let latest = latest_correctness(attempts);
        candidates
            .iter()
            .filter_map(|id| {
                latest
                    .get(id)
                    .map(|correct| (id, if *correct { 1.0 } else { 0.0 }))
            })
            .collect()
    } else {
        let ratios = aggregate_ratios(attempts);
        candidates
            .iter()
            .map(|id| (id, ratios.get(id).copied().unwrap_or(names::UNTRIED_RATIO)))
            .collect()
    };

    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.into_iter().take(n).map(|(id, _)| id.clone()).collect()
}

/// Filter mode: candidates whose history marks them for review. With
/// `latest_only` that means the most recent attempt was incorrect;
/// otherwise any incorrect attempt qualifies. Untried candidates are
/// never included.
pub fn incorrect_item_ids(
    attempts: &[AttemptRecord],
    candidates: &[String],
    latest_only: bool,
) -> Vec<String> {
    if latest_only {
        let latest = latest_correctness(attempts);
        candidates
            .iter()
            .filter(|id| latest.get(id.as_str()) == Some(&false))
            .cloned()
            .collect()
    } else {
        let ever_incorrect: HashSet<&str> = attempts
            .iter()
            .filter(|attempt| !attempt.is_correct)
            .map(|attempt| attempt.item_id.as_str())
            .collect();
        candidates
            .iter()
            .filter(|id| ever_incorrect.contains(id.as_str()))
            .cloned()
            .collect()
    }
}

/// Per-category accuracy over the full history. Uncategorized attempts
/// are skipped. Rows come out in category order.
pub fn category_stats(attempts: &[AttemptRecord]) -> Vec<CategoryStats> {
    let mut tallies: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for attempt in attempts {
        let Some(category) = attempt.category.as_deref() else {
            continue;
        };
        let (correct, total) = tallies.entry(category).or_insert((0, 0));
        *total += 1;
        if attempt.is_correct {
            *correct += 1;
        }
    }
    tallies
        .into_iter()
        .map(|(category, (correct, total))| CategoryStats {
            category: category.to_owned(),
            total,
            correct,
            accuracy: (correct as f64 * 1000.0 / total as f64).round() / 10.0,
        })
        .collect()
}
