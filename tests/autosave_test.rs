mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{engine, make_items, stores};
use quizcore::scheduler::{spawn_autosave, Scheduler, TokioScheduler};
use quizcore::store::SessionStore;
use quizcore::{names, EngineState, SelectionRequest};
use tokio::sync::Mutex;

#[tokio::test]
async fn periodic_autosave_persists_the_active_session() {
    let (catalog, history, sessions) = stores(make_items(3));
    let mut playing = engine(&catalog, &history, &sessions);
    playing.start(SelectionRequest::AllItems).await.unwrap();
    let session_id = playing.snapshot().unwrap().id.clone();
    let shared = Arc::new(Mutex::new(playing));

    let scheduler = TokioScheduler::new();
    let handles = spawn_autosave(Arc::clone(&shared), &scheduler, Duration::from_millis(10));

    tokio::time::sleep(Duration::from_millis(80)).await;

    let engine = shared.lock().await;
    let snapshot = engine.snapshot().unwrap();
    assert!(snapshot.last_saved_at.is_some());
    assert!(snapshot.is_paused);

    let stored = sessions.get(&session_id).await.unwrap().unwrap();
    assert!(stored.last_saved_at.is_some());

    let (periodic, suspend) = handles;
    periodic.cancel();
    suspend.cancel();
}

#[tokio::test]
async fn suspend_signal_triggers_an_immediate_save() {
    let (catalog, history, sessions) = stores(make_items(3));
    let mut playing = engine(&catalog, &history, &sessions);
    playing.start(SelectionRequest::AllItems).await.unwrap();
    let shared = Arc::new(Mutex::new(playing));

    let scheduler = TokioScheduler::new();
    // The periodic interval is far too long to fire during this test.
    let _handles = spawn_autosave(Arc::clone(&shared), &scheduler, names::AUTOSAVE_INTERVAL);

    // Let the signal listener get polled before signalling.
    tokio::time::sleep(Duration::from_millis(10)).await;
    scheduler.signal_suspend();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let engine = shared.lock().await;
    let snapshot = engine.snapshot().unwrap();
    assert!(snapshot.last_saved_at.is_some());
    assert!(snapshot.is_paused);
}

#[tokio::test]
async fn autosave_does_nothing_while_no_session_is_playing() {
    let (catalog, history, sessions) = stores(make_items(3));
    let idle = engine(&catalog, &history, &sessions);
    let shared = Arc::new(Mutex::new(idle));

    let scheduler = TokioScheduler::new();
    let _handles = spawn_autosave(Arc::clone(&shared), &scheduler, Duration::from_millis(5));

    tokio::time::sleep(Duration::from_millis(40)).await;

    let engine = shared.lock().await;
    assert_eq!(engine.state(), EngineState::Selecting);
    assert!(engine.snapshot().is_none());
    assert!(sessions.list_by_completion(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_schedule_stops_ticking() {
    let scheduler = TokioScheduler::new();
    let ticks = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);

    let handle = scheduler.schedule_periodic(
        Duration::from_millis(10),
        Box::new(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }),
    );

    tokio::time::sleep(Duration::from_millis(35)).await;
    handle.cancel();
    let seen = ticks.load(std::sync::atomic::Ordering::SeqCst);
    assert!(seen >= 1, "expected at least one tick before cancel");

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(ticks.load(std::sync::atomic::Ordering::SeqCst), seen);
}
