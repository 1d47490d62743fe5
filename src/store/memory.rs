// In-memory store backends. Cloneable handles over shared state, in the
// same shape a database-backed implementation would take. Used as the
// default local backend and by the test suite.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{HistoryStore, ItemCatalog, SessionStore, StoreResult};
use crate::error::StoreError;
use crate::models::{AttemptRecord, Item, QuizSetDefinition, SessionSnapshot};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> StoreResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend(format!("{what} lock poisoned")))
}

#[derive(Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<Mutex<CatalogState>>,
}

#[derive(Default)]
struct CatalogState {
    items: Vec<Item>,
    quiz_sets: Vec<QuizSetDefinition>,
    stable_ids: bool,
}

impl MemoryCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        debug_assert!(
            items.iter().all(Item::is_well_formed),
            "catalog contains malformed items"
        );
        Self {
            inner: Arc::new(Mutex::new(CatalogState {
                items,
                quiz_sets: Vec::new(),
                stable_ids: true,
            })),
        }
    }

    pub fn add_quiz_set(&self, quiz_set: QuizSetDefinition) {
        if let Ok(mut state) = self.inner.lock() {
            state.quiz_sets.push(quiz_set);
        }
    }

    pub fn remove_item(&self, id: &str) {
        if let Ok(mut state) = self.inner.lock() {
            state.items.retain(|item| item.id != id);
        }
    }

    /// Test hook: pretend ids are not stable so sessions embed full items.
    pub fn set_stable_ids(&self, stable: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.stable_ids = stable;
        }
    }
}

#[async_trait]
impl ItemCatalog for MemoryCatalog {
    async fn get_all_items(&self) -> StoreResult<Vec<Item>> {
        Ok(lock(&self.inner, "catalog")?.items.clone())
    }

    async fn get_items_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Item>> {
        let state = lock(&self.inner, "catalog")?;
        Ok(ids
            .iter()
            .filter_map(|id| state.items.iter().find(|item| &item.id == id).cloned())
            .collect())
    }

    async fn get_quiz_set(&self, id: &str) -> StoreResult<Option<QuizSetDefinition>> {
        let state = lock(&self.inner, "catalog")?;
        Ok(state.quiz_sets.iter().find(|set| set.id == id).cloned())
    }

    fn has_stable_ids(&self) -> bool {
        self.inner.lock().map(|state| state.stable_ids).unwrap_or(false)
    }
}

#[derive(Clone, Default)]
pub struct MemoryHistory {
    inner: Arc<Mutex<Vec<AttemptRecord>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: make every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append_attempt(&self, record: AttemptRecord) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("history write failure injected".into()));
        }
        lock(&self.inner, "history")?.push(record);
        Ok(())
    }

    async fn get_all_attempts(&self) -> StoreResult<Vec<AttemptRecord>> {
        Ok(lock(&self.inner, "history")?.clone())
    }
}

#[derive(Clone, Default)]
pub struct MemorySessions {
    // Ulid keys sort by creation time, so iteration order is chronological.
    inner: Arc<Mutex<BTreeMap<String, SessionSnapshot>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: make every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn get(&self, id: &str) -> StoreResult<Option<SessionSnapshot>> {
        Ok(lock(&self.inner, "sessions")?.get(id).cloned())
    }

    async fn put(&self, snapshot: &SessionSnapshot) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("session write failure injected".into()));
        }
        lock(&self.inner, "sessions")?.insert(snapshot.id.clone(), snapshot.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        lock(&self.inner, "sessions")?.remove(id);
        Ok(())
    }

    async fn list_by_completion(&self, is_completed: bool) -> StoreResult<Vec<SessionSnapshot>> {
        let sessions = lock(&self.inner, "sessions")?;
        Ok(sessions
            .values()
            .filter(|snapshot| snapshot.is_completed == is_completed)
            .cloned()
            .collect())
    }
}
