// The play-through state machine: owns the one active session snapshot,
// scores answers, and keeps history and session stores up to date.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ulid::Ulid;

use crate::error::{EngineError, StoreError};
use crate::models::{Answer, AttemptRecord, Item, ItemKind, SessionSnapshot, SnapshotItems};
use crate::selector::{self, SelectionRequest};
use crate::store::{HistoryStore, ItemCatalog, SessionStore};

/// Engine states. `Playing` means a non-completed snapshot is active;
/// `Finished` is the terminal view of a just-completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Selecting,
    Playing,
    Finished,
}

/// Verdict and bookkeeping returned by `submit_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// True exactly once, on the answer that finishes the session.
    pub completed: bool,
    /// Non-fatal persistence failures; the in-memory session has already
    /// advanced and the caller decides how to notify or retry.
    pub warnings: Vec<PersistWarning>,
}

/// A store write that failed without stopping the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistWarning {
    /// Serious: missing history rows corrupt future difficulty ranking.
    HistoryWriteFailed(StoreError),
    /// The snapshot on disk is stale; the quiz itself is unaffected.
    SnapshotWriteFailed(StoreError),
}

/// One engine instance drives one play-through at a time. Construct it
/// with the three store handles, `start` or `resume` a session, then feed
/// it answers. The UI treats it as an opaque handle.
pub struct SessionEngine<C, H, S> {
    catalog: C,
    history: H,
    sessions: S,
    state: EngineState,
    snapshot: Option<SessionSnapshot>,
    /// Materialized working set for the active session, in play order.
    items: Vec<Item>,
}

impl<C, H, S> SessionEngine<C, H, S>
where
    C: ItemCatalog,
    H: HistoryStore,
    S: SessionStore,
{
    pub fn new(catalog: C, history: H, sessions: S) -> Self {
        Self {
            catalog,
            history,
            sessions,
            state: EngineState::Selecting,
            snapshot: None,
            items: Vec::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }

    /// The item the cursor points at, if a session is active and unfinished.
    pub fn current_item(&self) -> Option<&Item> {
        let snapshot = self.snapshot.as_ref()?;
        self.items.get(snapshot.cursor)
    }

    /// `(answered, total)` for the active session.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.snapshot
            .as_ref()
            .map(|snapshot| (snapshot.cursor, self.items.len()))
    }

    /// Select a working set and begin a fresh session. On `EmptySelection`
    /// nothing is persisted and the engine stays in `Selecting`.
    pub async fn start(&mut self, request: SelectionRequest) -> Result<(), EngineError> {
        if self.state == EngineState::Playing {
            return Err(EngineError::InvalidSessionState(self.state));
        }

        let shuffle_seed: u64 = rand::random();
        let mut rng = StdRng::seed_from_u64(shuffle_seed);
        let items = selector::select_items(&self.catalog, &self.history, &request, &mut rng).await?;

        let stored_items = if self.catalog.has_stable_ids() {
            SnapshotItems::Refs(items.iter().map(|item| item.id.clone()).collect())
        } else {
            SnapshotItems::Embedded(items.clone())
        };

        let snapshot = SessionSnapshot {
            id: Ulid::new().to_string(),
            source: request,
            items: stored_items,
            shuffle_seed,
            cursor: 0,
            score: 0,
            answers: Vec::new(),
            started_at: Utc::now(),
            is_completed: false,
            is_paused: false,
            paused_at: None,
            resumed_at: None,
            last_saved_at: None,
            completed_at: None,
        };

        self.sessions.put(&snapshot).await?;

        tracing::info!(
            "session created: id={}, items={}, seed={shuffle_seed}",
            snapshot.id,
            items.len()
        );

        self.items = items;
        self.snapshot = Some(snapshot);
        self.state = EngineState::Playing;
        self.check_invariants();
        Ok(())
    }

    /// Load a saved session and continue playing at its saved cursor.
    /// Fails without touching engine state: `SessionNotFound` for a
    /// missing snapshot (or one whose item refs no longer resolve),
    /// `InvalidSessionState` for a completed one.
    pub async fn resume(&mut self, session_id: &str) -> Result<(), EngineError> {
        if self.state == EngineState::Playing {
            return Err(EngineError::InvalidSessionState(self.state));
        }

        let Some(mut snapshot) = self.sessions.get(session_id).await? else {
            return Err(EngineError::SessionNotFound(session_id.to_owned()));
        };
        if snapshot.is_completed {
            return Err(EngineError::InvalidSessionState(EngineState::Finished));
        }

        let items = match &snapshot.items {
            SnapshotItems::Embedded(items) => items.clone(),
            SnapshotItems::Refs(ids) => {
                let resolved = self.catalog.get_items_by_ids(ids).await?;
                if resolved.len() != ids.len() {
                    tracing::warn!(
                        "session {session_id} references {} items but only {} resolve",
                        ids.len(),
                        resolved.len()
                    );
                    return Err(EngineError::SessionNotFound(session_id.to_owned()));
                }
                resolved
            }
        };

        snapshot.is_paused = false;
        snapshot.resumed_at = Some(Utc::now());
        self.sessions.put(&snapshot).await?;

        tracing::info!(
            "session resumed: id={}, cursor={}/{}",
            snapshot.id,
            snapshot.cursor,
            items.len()
        );

        self.items = items;
        self.snapshot = Some(snapshot);
        self.state = EngineState::Playing;
        self.check_invariants();
        Ok(())
    }

    /// Score an answer against the current item and advance the cursor.
    ///
    /// The history row is written first and unconditionally: history is
    /// the source of truth for future ranking, so it must not depend on
    /// the snapshot write. Either write failing is reported as a warning
    /// on the outcome, never as an error; a persistence problem must not
    /// block the quiz the user is actively taking.
    pub async fn submit_answer(&mut self, answer: Answer) -> Result<AnswerOutcome, EngineError> {
        if self.state != EngineState::Playing {
            return Err(EngineError::InvalidSessionState(self.state));
        }
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Err(EngineError::InvalidSessionState(self.state));
        };
        let Some(item) = self.items.get(snapshot.cursor) else {
            return Err(EngineError::InvalidSessionState(self.state));
        };

        let is_correct = grade(item, answer);

        snapshot.answers.push(answer);
        snapshot.cursor += 1;
        if is_correct {
            snapshot.score += 1;
        }

        let mut warnings = Vec::new();

        let record = AttemptRecord {
            item_id: item.id.clone(),
            category: item.category.clone(),
            is_correct,
            submitted: answer,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.history.append_attempt(record).await {
            tracing::error!("history write failed for item={}: {e}", item.id);
            warnings.push(PersistWarning::HistoryWriteFailed(e));
        }

        let completed = snapshot.cursor == self.items.len();
        if completed {
            snapshot.is_completed = true;
            snapshot.completed_at = Some(Utc::now());
            snapshot.is_paused = false;
            snapshot.paused_at = None;
        }

        if let Err(e) = self.sessions.put(snapshot).await {
            tracing::warn!("snapshot write failed for session={}: {e}", snapshot.id);
            warnings.push(PersistWarning::SnapshotWriteFailed(e));
        }

        if completed {
            tracing::info!(
                "session completed: id={}, score={}/{}",
                snapshot.id,
                snapshot.score,
                self.items.len()
            );
            self.state = EngineState::Finished;
        }

        self.check_invariants();
        Ok(AnswerOutcome {
            is_correct,
            completed,
            warnings,
        })
    }

    /// Pause-and-persist the active session. Idempotent: never advances
    /// the cursor, only refreshes the pause/save timestamps. A failed
    /// write is returned for notification and leaves in-memory progress
    /// untouched.
    pub async fn save_progress(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Playing {
            return Err(EngineError::InvalidSessionState(self.state));
        }
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Err(EngineError::InvalidSessionState(self.state));
        };

        let now = Utc::now();
        snapshot.is_paused = true;
        snapshot.paused_at = Some(now);
        snapshot.last_saved_at = Some(now);
        self.sessions.put(snapshot).await?;

        tracing::info!(
            "session saved: id={}, cursor={}/{}",
            snapshot.id,
            snapshot.cursor,
            self.items.len()
        );
        Ok(())
    }

    /// Save and return to mode selection. The snapshot stays resumable.
    /// The transition happens even if the save fails; the error comes
    /// back for notification.
    pub async fn abandon(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Playing {
            return Err(EngineError::InvalidSessionState(self.state));
        }

        let save_result = self.save_progress().await;

        if let Some(snapshot) = self.snapshot.take() {
            tracing::info!("session abandoned: id={}, cursor={}", snapshot.id, snapshot.cursor);
        }
        self.items.clear();
        self.state = EngineState::Selecting;
        save_result
    }

    /// Maintenance: remove one stored snapshot. Independent of the active
    /// state machine.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), EngineError> {
        self.sessions.delete(session_id).await?;
        tracing::info!("deleted session {session_id}");
        Ok(())
    }

    /// Maintenance: bulk-remove completed snapshots. Returns how many
    /// were deleted.
    pub async fn delete_completed(&self) -> Result<usize, EngineError> {
        let completed = self.sessions.list_by_completion(true).await?;
        let count = completed.len();
        for snapshot in completed {
            self.sessions.delete(&snapshot.id).await?;
        }
        if count > 0 {
            tracing::info!("deleted {count} completed sessions");
        }
        Ok(count)
    }

    /// Saved, non-completed sessions available for resume.
    pub async fn resumable_sessions(&self) -> Result<Vec<SessionSnapshot>, EngineError> {
        Ok(self.sessions.list_by_completion(false).await?)
    }

    /// Session bookkeeping must stay consistent after every mutation.
    fn check_invariants(&self) {
        if let Some(snapshot) = &self.snapshot {
            debug_assert!(snapshot.cursor <= self.items.len());
            debug_assert_eq!(snapshot.answers.len(), snapshot.cursor);
            debug_assert!(snapshot.score <= snapshot.cursor);
            debug_assert!(!snapshot.is_completed || snapshot.cursor == self.items.len());
        }
    }
}

/// Exact-equality grading; no partial credit. A kind-mismatched answer is
/// a caller bug and never scores.
fn grade(item: &Item, answer: Answer) -> bool {
    match (&item.kind, answer) {
        (ItemKind::TrueFalse { correct }, Answer::Bool(submitted)) => submitted == *correct,
        (ItemKind::MultipleChoice { correct_index, .. }, Answer::Choice(submitted)) => {
            submitted == *correct_index
        }
        _ => {
            debug_assert!(false, "answer kind does not match item kind");
            false
        }
    }
}
