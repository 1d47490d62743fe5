// Autosave scheduling. The engine depends on a scheduler seam instead of
// a concrete runtime timer, so hosts can bind their own tick source and
// visibility/suspend signals.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::MissedTickBehavior;

use crate::engine::{EngineState, SessionEngine};
use crate::store::{HistoryStore, ItemCatalog, SessionStore};

/// Cancels its scheduled work when invoked, or when dropped.
pub struct CancelHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Timer and environment-signal source for autosave.
pub trait Scheduler {
    /// Invoke `callback` every `interval` until the handle is cancelled.
    fn schedule_periodic(
        &self,
        interval: Duration,
        callback: Box<dyn Fn() + Send + Sync>,
    ) -> CancelHandle;

    /// Invoke `callback` whenever the host signals a suspend (tab hidden,
    /// app backgrounded, navigation away).
    fn on_suspend_signal(&self, callback: Box<dyn Fn() + Send + Sync>) -> CancelHandle;
}

/// Scheduler backed by tokio tasks. The host forwards its environment's
/// suspend events through `signal_suspend`.
#[derive(Clone, Default)]
pub struct TokioScheduler {
    suspend: Arc<Notify>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host hook for visibility loss and the like.
    pub fn signal_suspend(&self) {
        self.suspend.notify_waiters();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_periodic(
        &self,
        interval: Duration,
        callback: Box<dyn Fn() + Send + Sync>,
    ) -> CancelHandle {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the first
            // callback fires one full interval in.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                callback();
            }
        });
        CancelHandle::new(move || task.abort())
    }

    fn on_suspend_signal(&self, callback: Box<dyn Fn() + Send + Sync>) -> CancelHandle {
        let suspend = Arc::clone(&self.suspend);
        let task = tokio::spawn(async move {
            loop {
                suspend.notified().await;
                callback();
            }
        });
        CancelHandle::new(move || task.abort())
    }
}

/// Shared engine handle. The mutex is what keeps `save_progress` and
/// `submit_answer` mutually exclusive on the same session.
pub type SharedEngine<C, H, S> = Arc<Mutex<SessionEngine<C, H, S>>>;

/// Wire periodic autosave plus suspend-signal saves to a shared engine.
/// Saves only happen while a session is playing. Both handles cancel
/// their work when dropped, so the caller must keep them alive.
pub fn spawn_autosave<C, H, S>(
    engine: SharedEngine<C, H, S>,
    scheduler: &dyn Scheduler,
    interval: Duration,
) -> (CancelHandle, CancelHandle)
where
    C: ItemCatalog + 'static,
    H: HistoryStore + 'static,
    S: SessionStore + 'static,
{
    let periodic = {
        let engine = Arc::clone(&engine);
        scheduler.schedule_periodic(
            interval,
            Box::new(move || save_if_playing(Arc::clone(&engine))),
        )
    };
    let suspend =
        scheduler.on_suspend_signal(Box::new(move || save_if_playing(Arc::clone(&engine))));
    (periodic, suspend)
}

fn save_if_playing<C, H, S>(engine: SharedEngine<C, H, S>)
where
    C: ItemCatalog + 'static,
    H: HistoryStore + 'static,
    S: SessionStore + 'static,
{
    tokio::spawn(async move {
        let mut engine = engine.lock().await;
        if engine.state() != EngineState::Playing {
            return;
        }
        if let Err(e) = engine.save_progress().await {
            tracing::warn!("autosave failed: {e}");
        }
    });
}
