use std::time::Duration;

// Session defaults
pub const DEFAULT_WORST_COUNT: usize = 20;

/// Ratio assigned to items with no recorded attempts, so untried items
/// interleave with moderately difficult ones instead of dominating the
/// worst-problems ranking or being ignored by it.
pub const UNTRIED_RATIO: f64 = 0.5;

/// Wall-clock interval between autosave ticks while a session is playing.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Multiple-choice items carry at least this many options.
pub const MIN_OPTION_COUNT: usize = 2;
