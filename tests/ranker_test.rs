mod common;

use common::attempt;
use quizcore::ranker;

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn latest_attempt_wins_by_timestamp() {
    let attempts = vec![attempt("a", true, 1), attempt("a", false, 2)];

    let latest = ranker::latest_correctness(&attempts);
    assert_eq!(latest.get("a"), Some(&false));

    // The later timestamp wins regardless of record order.
    let reversed = vec![attempt("a", false, 2), attempt("a", true, 1)];
    let latest = ranker::latest_correctness(&reversed);
    assert_eq!(latest.get("a"), Some(&false));
}

#[test]
fn equal_timestamps_resolve_by_insertion_order() {
    let attempts = vec![attempt("a", true, 5), attempt("a", false, 5)];

    let latest = ranker::latest_correctness(&attempts);
    assert_eq!(latest.get("a"), Some(&false));
}

#[test]
fn aggregate_ratio_covers_all_attempts() {
    let attempts = vec![
        attempt("a", true, 1),
        attempt("a", false, 2),
        attempt("a", true, 3),
    ];

    let ratios = ranker::aggregate_ratios(&attempts);
    let ratio = ratios.get("a").expect("item a should have a ratio");
    assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
    assert!(ratios.get("never-tried").is_none());
}

#[test]
fn worst_n_sorts_ascending_by_ratio() {
    // a: 2/2 = 1.0, b: 1/3 ~= 0.33, c: 3/5 = 0.6
    let mut attempts = vec![attempt("a", true, 1), attempt("a", true, 2)];
    attempts.extend([attempt("b", true, 3), attempt("b", false, 4), attempt("b", false, 5)]);
    attempts.extend([
        attempt("c", true, 6),
        attempt("c", true, 7),
        attempt("c", true, 8),
        attempt("c", false, 9),
        attempt("c", false, 10),
    ]);

    let worst = ranker::worst_n(&attempts, &ids(&["a", "b", "c"]), 2, false);
    assert_eq!(worst, ids(&["b", "c"]));
}

#[test]
fn worst_n_defaults_untried_items_to_neutral_ratio() {
    // a: 0.0, b: untried (0.5), c: 1.0
    let attempts = vec![attempt("a", false, 1), attempt("c", true, 2)];

    let worst = ranker::worst_n(&attempts, &ids(&["c", "b", "a"]), 3, false);
    assert_eq!(worst, ids(&["a", "b", "c"]));
}

#[test]
fn worst_n_latest_only_excludes_untried_items() {
    let attempts = vec![attempt("a", true, 1), attempt("a", false, 2)];

    let worst = ranker::worst_n(&attempts, &ids(&["a", "b"]), 10, true);
    assert_eq!(worst, ids(&["a"]));
}

#[test]
fn worst_n_latest_only_scores_by_most_recent_attempt() {
    // a recovered (latest correct), b regressed (latest incorrect).
    let attempts = vec![
        attempt("a", false, 1),
        attempt("a", true, 2),
        attempt("b", true, 3),
        attempt("b", false, 4),
    ];

    let worst = ranker::worst_n(&attempts, &ids(&["a", "b"]), 2, true);
    assert_eq!(worst, ids(&["b", "a"]));
}

#[test]
fn worst_n_returns_at_most_n() {
    let attempts: Vec<_> = (0..5).map(|i| attempt(&format!("q{i}"), false, i)).collect();
    let candidates = ids(&["q0", "q1", "q2", "q3", "q4"]);

    assert_eq!(ranker::worst_n(&attempts, &candidates, 3, false).len(), 3);
    assert_eq!(ranker::worst_n(&attempts, &candidates, 20, false).len(), 5);
}

#[test]
fn worst_n_ties_keep_candidate_order() {
    // No history at all: every candidate ties at the untried default.
    let worst = ranker::worst_n(&[], &ids(&["c", "a", "b"]), 3, false);
    assert_eq!(worst, ids(&["c", "a", "b"]));
}

#[test]
fn incorrect_filter_latest_only_tracks_most_recent_attempt() {
    // a: ended incorrect, b: recovered, c: untried.
    let attempts = vec![
        attempt("a", true, 1),
        attempt("a", false, 2),
        attempt("b", false, 3),
        attempt("b", true, 4),
    ];
    let candidates = ids(&["a", "b", "c"]);

    let latest = ranker::incorrect_item_ids(&attempts, &candidates, true);
    assert_eq!(latest, ids(&["a"]));

    // Full history: any incorrect attempt qualifies.
    let any = ranker::incorrect_item_ids(&attempts, &candidates, false);
    assert_eq!(any, ids(&["a", "b"]));
}

#[test]
fn category_stats_rounds_accuracy_to_one_decimal() {
    let mut attempts = vec![
        attempt("a", true, 1),
        attempt("b", true, 2),
        attempt("c", false, 3),
    ];
    for a in &mut attempts {
        a.category = Some("Math".to_string());
    }
    // Uncategorized attempts are skipped.
    attempts.push(attempt("d", true, 4));

    let stats = ranker::category_stats(&attempts);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].category, "Math");
    assert_eq!(stats[0].total, 3);
    assert_eq!(stats[0].correct, 2);
    assert!((stats[0].accuracy - 66.7).abs() < 1e-9);
}
