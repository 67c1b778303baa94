//! Session orchestration: scan persistence, paced delete batches,
//! cancellation, and post-batch cleanup. Runs on a paused clock so the
//! pacing assertions are exact.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use unrepost_api::ClientError;
use unrepost_core::{Cursor, ItemId, PacingConfig, PageResult, RepostItem, ScanCache};
use unrepost_session::{BatchTally, RemovalSession, RepostClient, SessionObserver, SessionPhase};

/// One recorded client call with its (paused-clock) timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClientCall {
    Fetch { cursor: String },
    Delete { item_id: String },
}

/// Client that replays scripted results and records every call.
#[derive(Default)]
struct ScriptedClient {
    pages: Mutex<VecDeque<Result<PageResult, ClientError>>>,
    deletes: Mutex<VecDeque<Result<bool, ClientError>>>,
    calls: Mutex<Vec<(ClientCall, Instant)>>,
}

impl ScriptedClient {
    fn push_page(&self, page: Result<PageResult, ClientError>) {
        self.pages.lock().unwrap().push_back(page);
    }

    fn push_delete(&self, result: Result<bool, ClientError>) {
        self.deletes.lock().unwrap().push_back(result);
    }

    fn calls(&self) -> Vec<(ClientCall, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    fn delete_times(&self) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter_map(|(call, at)| matches!(call, ClientCall::Delete { .. }).then_some(at))
            .collect()
    }
}

#[async_trait]
impl RepostClient for ScriptedClient {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, ClientError> {
        self.calls.lock().unwrap().push((
            ClientCall::Fetch {
                cursor: cursor.as_str().to_string(),
            },
            Instant::now(),
        ));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted fetch_page call")
    }

    async fn delete_item(&self, item_id: &ItemId) -> Result<bool, ClientError> {
        self.calls.lock().unwrap().push((
            ClientCall::Delete {
                item_id: item_id.as_str().to_string(),
            },
            Instant::now(),
        ));
        self.deletes
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted delete_item call")
    }
}

fn item(id: &str) -> RepostItem {
    RepostItem {
        id: ItemId::new(id).expect("valid item id"),
        author_handle: "@alice".to_string(),
        description: String::new(),
        canonical_url: format!("https://www.tiktok.com/@alice/video/{id}"),
    }
}

fn page(ids: &[&str], has_more: bool, next: Option<&str>) -> PageResult {
    PageResult {
        items: ids.iter().map(|id| item(id)).collect(),
        has_more,
        next_cursor: next.map(Cursor::from_response),
    }
}

fn no_jitter_pacing() -> PacingConfig {
    PacingConfig {
        jitter_ms: 0,
        ..PacingConfig::default()
    }
}

fn session_in(
    dir: &tempfile::TempDir,
    client: Arc<ScriptedClient>,
    pacing: PacingConfig,
) -> RemovalSession {
    let cache = ScanCache::new(dir.path().join("last_scan.json"));
    RemovalSession::new(client, cache, pacing)
}

#[tokio::test(start_paused = true)]
async fn scan_persists_the_working_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    client.push_page(Ok(page(&["7001", "7002"], false, None)));

    let mut session = session_in(&dir, client, no_jitter_pacing());
    let count = session.scan().await.expect("scan");

    assert_eq!(count, 2);
    assert_eq!(session.items().len(), 2);
    assert_eq!(session.phase(), SessionPhase::Idle);

    let cache = ScanCache::new(dir.path().join("last_scan.json"));
    let stored = cache.load().expect("read slot").expect("slot populated");
    assert_eq!(stored, session.items());
}

#[tokio::test(start_paused = true)]
async fn restore_repopulates_from_the_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = ScanCache::new(dir.path().join("last_scan.json"));
    cache
        .store(&[item("7001"), item("7002"), item("7003")])
        .expect("seed slot");

    let client = Arc::new(ScriptedClient::default());
    let mut session = session_in(&dir, client, no_jitter_pacing());

    assert_eq!(session.restore().expect("restore"), 3);
    assert_eq!(session.items()[0].id.as_str(), "7001");
}

#[tokio::test(start_paused = true)]
async fn restore_of_an_empty_slot_is_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    let mut session = session_in(&dir, client, no_jitter_pacing());

    assert_eq!(session.restore().expect("restore"), 0);
    assert!(session.items().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scan_all_follows_cursors_and_drops_repeats() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    client.push_page(Ok(page(&["7001", "7002"], true, Some("1717"))));
    // The page boundary slid; 7002 shows up again on page two.
    client.push_page(Ok(page(&["7002", "7003"], false, None)));

    let mut session = session_in(&dir, client.clone(), no_jitter_pacing());
    let count = session.scan_all(5).await.expect("scan all");

    assert_eq!(count, 3);
    let ids: Vec<_> = session.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["7001", "7002", "7003"]);

    let calls = client.calls();
    assert_eq!(
        calls[1].0,
        ClientCall::Fetch {
            cursor: "1717".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn delete_batch_paces_items_and_cleans_up() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    client.push_page(Ok(page(&["7001", "7002", "7003"], false, None)));
    for _ in 0..3 {
        client.push_delete(Ok(true));
    }
    // Post-batch rescan finds nothing left.
    client.push_page(Ok(page(&[], false, None)));

    let mut session = session_in(&dir, client.clone(), no_jitter_pacing());
    session.scan().await.expect("scan");

    let tally = session.delete_all().await.expect("delete batch");
    assert_eq!(
        tally,
        BatchTally {
            total: 3,
            deleted: 3,
            failed: 0
        }
    );
    assert!(tally.complete());
    assert!(session.items().is_empty());
    assert_eq!(session.phase(), SessionPhase::Idle);

    // Exactly delete_delay_ms between consecutive deletes, none after the last.
    let times = client.delete_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_millis(1000));
    assert_eq!(times[2] - times[1], Duration::from_millis(1000));

    // The slot is cleared and a rescan ran.
    let cache = ScanCache::new(dir.path().join("last_scan.json"));
    let fetches = client
        .calls()
        .into_iter()
        .filter(|(call, _)| matches!(call, ClientCall::Fetch { .. }))
        .count();
    assert_eq!(fetches, 2);
    // The rescan found nothing, so the slot holds an empty list.
    assert_eq!(cache.load().expect("read slot"), Some(Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn failed_items_still_count_toward_completion() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    client.push_page(Ok(page(&["7001", "7002", "7003"], false, None)));
    client.push_delete(Ok(true));
    client.push_delete(Err(ClientError::Api {
        code: 100,
        message: "delete request rejected".to_string(),
    }));
    client.push_delete(Ok(true));
    client.push_page(Ok(page(&["7002"], false, None)));

    let mut session = session_in(&dir, client, no_jitter_pacing());
    session.scan().await.expect("scan");

    let tally = session.delete_all().await.expect("delete batch");
    assert_eq!(tally.deleted, 2);
    assert_eq!(tally.failed, 1);
    assert!(tally.complete());

    // The rescan repopulated the working set with the survivor.
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.items()[0].id.as_str(), "7002");
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_between_items_and_keeps_the_working_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    client.push_page(Ok(page(&["7001", "7002", "7003"], false, None)));
    client.push_delete(Ok(true));
    client.push_delete(Ok(true));

    let mut session = session_in(&dir, client.clone(), no_jitter_pacing());
    session.scan().await.expect("scan");

    // Fires during the pause after the second delete.
    let token = session.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        token.cancel();
    });

    let tally = session.delete_all().await.expect("cancelled batch");
    assert_eq!(tally.processed(), 2);
    assert!(!tally.complete());
    assert_eq!(session.phase(), SessionPhase::Idle);

    // Working set and slot survive a cancelled batch.
    assert_eq!(session.items().len(), 3);
    let cache = ScanCache::new(dir.path().join("last_scan.json"));
    assert_eq!(cache.load().expect("read slot").map(|v| v.len()), Some(3));

    // A fresh token means the next batch is not stillborn.
    assert!(!session.cancellation_token().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn jittered_pauses_stay_within_the_configured_band() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    client.push_page(Ok(page(&["7001", "7002"], false, None)));
    client.push_delete(Ok(true));
    client.push_delete(Ok(true));
    client.push_page(Ok(page(&[], false, None)));

    let pacing = PacingConfig::default();
    assert_eq!(pacing.delete_delay_ms, 1000);
    assert_eq!(pacing.jitter_ms, 575);

    let mut session = session_in(&dir, client.clone(), pacing);
    session.scan().await.expect("scan");
    session.delete_all().await.expect("delete batch");

    let times = client.delete_times();
    let gap = times[1] - times[0];
    assert!(gap >= Duration::from_millis(1000), "gap was {gap:?}");
    assert!(gap < Duration::from_millis(1575), "gap was {gap:?}");
}

#[tokio::test(start_paused = true)]
async fn empty_working_set_is_a_noop_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());

    let mut session = session_in(&dir, client.clone(), no_jitter_pacing());
    let tally = session.delete_all().await.expect("empty batch");

    assert_eq!(tally.total, 0);
    assert!(tally.complete());
    assert!(client.calls().is_empty());
}

#[derive(Default)]
struct CountingObserver {
    progress: AtomicUsize,
    scans: AtomicUsize,
    phases: Mutex<Vec<SessionPhase>>,
}

impl SessionObserver for CountingObserver {
    fn on_phase(&self, phase: SessionPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_progress(&self, _tally: &BatchTally) {
        self.progress.fetch_add(1, Ordering::SeqCst);
    }

    fn on_scan_complete(&self, _count: usize) {
        self.scans.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn observer_sees_every_step() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(ScriptedClient::default());
    client.push_page(Ok(page(&["7001", "7002"], false, None)));
    client.push_delete(Ok(true));
    client.push_delete(Ok(true));
    client.push_page(Ok(page(&[], false, None)));

    let observer = Arc::new(CountingObserver::default());
    let mut session = session_in(&dir, client, no_jitter_pacing()).with_observer(observer.clone());

    session.scan().await.expect("scan");
    session.delete_all().await.expect("delete batch");

    // One progress callback per item, one scan callback per scan.
    assert_eq!(observer.progress.load(Ordering::SeqCst), 2);
    assert_eq!(observer.scans.load(Ordering::SeqCst), 2);

    let phases = observer.phases.lock().unwrap().clone();
    assert_eq!(
        phases,
        vec![
            SessionPhase::Scanning,
            SessionPhase::Idle,
            SessionPhase::Deleting,
            SessionPhase::Idle,
            SessionPhase::Scanning,
            SessionPhase::Idle,
        ]
    );
}
