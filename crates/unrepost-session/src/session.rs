//! Scan-and-remove session state machine.
//!
//! One session owns one account's working set: the items found by the last
//! scan, the persisted copy of that scan, and the state of the current
//! delete batch. Batches run strictly one item at a time with a paced,
//! jittered pause between removals; a burst of deletes looks nothing like a
//! person and invites rate limiting.

use crate::client::RepostClient;
use crate::error::{Result, SessionError};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use unrepost_core::{Cursor, PacingConfig, RepostItem, ScanCache};

/// What the session is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing in flight.
    Idle,
    /// A scan is fetching pages.
    Scanning,
    /// A delete batch is walking the working set.
    Deleting,
}

/// Running counts for one delete batch.
///
/// `total` is fixed when the batch starts; a scan finishing mid-batch never
/// moves the goalposts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTally {
    /// Items in the batch when it started.
    pub total: usize,
    /// Items confirmed removed.
    pub deleted: usize,
    /// Items that failed after the engines gave up on them.
    pub failed: usize,
}

impl BatchTally {
    fn started(total: usize) -> Self {
        Self {
            total,
            deleted: 0,
            failed: 0,
        }
    }

    /// Items processed so far, success or not.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.deleted + self.failed
    }

    /// Whether every item in the batch has been accounted for.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.processed() >= self.total
    }
}

/// Receives progress callbacks from a running session.
///
/// All callbacks have no-op defaults; implement only what you display.
pub trait SessionObserver: Send + Sync {
    /// The session moved to a new phase.
    fn on_phase(&self, phase: SessionPhase) {
        let _ = phase;
    }

    /// One more item of the current batch was processed.
    fn on_progress(&self, tally: &BatchTally) {
        let _ = tally;
    }

    /// A scan finished with `count` items in the working set.
    fn on_scan_complete(&self, count: usize) {
        let _ = count;
    }
}

struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Drives one account's scan-and-remove cycle.
pub struct RemovalSession {
    client: Arc<dyn RepostClient>,
    cache: ScanCache,
    pacing: PacingConfig,
    observer: Arc<dyn SessionObserver>,
    cancel: CancellationToken,
    phase: SessionPhase,
    items: Vec<RepostItem>,
}

impl RemovalSession {
    /// Create an idle session with an empty working set.
    #[must_use]
    pub fn new(client: Arc<dyn RepostClient>, cache: ScanCache, pacing: PacingConfig) -> Self {
        Self {
            client,
            cache,
            pacing,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
            phase: SessionPhase::Idle,
            items: Vec::new(),
        }
    }

    /// Attach a progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The current working set, in scan order.
    #[must_use]
    pub fn items(&self) -> &[RepostItem] {
        &self.items
    }

    /// Token that cancels the current or next delete batch between items.
    ///
    /// Grab it before starting the batch; a cancelled batch gets a fresh
    /// token so the next one starts clean.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Repopulate the working set from the persisted scan, if one exists.
    ///
    /// Returns the number of restored items; zero when the slot is empty.
    pub fn restore(&mut self) -> Result<usize> {
        match self.cache.load()? {
            Some(items) => {
                let count = items.len();
                self.items = items;
                tracing::debug!(count, "restored working set from cache");
                Ok(count)
            }
            None => Ok(0),
        }
    }

    /// Scan the first page of reposts into the working set.
    ///
    /// The result replaces the working set and is persisted to the scan
    /// cache. Returns the number of items found.
    pub async fn scan(&mut self) -> Result<usize> {
        self.scan_pages(1).await
    }

    /// Scan up to `max_pages` pages, following cursors, into the working set.
    pub async fn scan_all(&mut self, max_pages: usize) -> Result<usize> {
        self.scan_pages(max_pages.max(1)).await
    }

    async fn scan_pages(&mut self, max_pages: usize) -> Result<usize> {
        if self.phase == SessionPhase::Deleting {
            return Err(SessionError::Busy);
        }
        self.set_phase(SessionPhase::Scanning);

        let result = self.collect_pages(max_pages).await;
        self.set_phase(SessionPhase::Idle);
        let found = result?;

        self.items = found;
        if let Err(e) = self.cache.store(&self.items) {
            tracing::warn!(error = %e, "failed to persist scan result");
        }
        let count = self.items.len();
        tracing::info!(count, "scan complete");
        self.observer.on_scan_complete(count);
        Ok(count)
    }

    async fn collect_pages(&self, max_pages: usize) -> Result<Vec<RepostItem>> {
        let mut found = Vec::new();
        let mut seen: HashSet<_> = HashSet::new();
        let mut cursor = Cursor::start();

        for _ in 0..max_pages {
            let page = self.client.fetch_page(&cursor).await?;
            for item in page.items {
                // A page boundary can shift under us mid-scan; ids repeat.
                if seen.insert(item.id.clone()) {
                    found.push(item);
                } else {
                    tracing::debug!(id = %item.id, "dropping item repeated across pages");
                }
            }
            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = next,
                _ => break,
            }
        }

        Ok(found)
    }

    /// Delete every item in the working set, one at a time.
    ///
    /// The batch size is fixed at entry. Between items the session sleeps
    /// for the configured delay plus random jitter. Cancellation is checked
    /// before each item; a cancelled batch returns its partial tally and
    /// leaves the working set intact.
    ///
    /// A batch that accounts for every item clears the working set and the
    /// scan cache, then rescans so the working set reflects whatever the
    /// server still reports.
    pub async fn delete_all(&mut self) -> Result<BatchTally> {
        if self.phase == SessionPhase::Deleting {
            return Err(SessionError::Busy);
        }

        let batch = self.items.clone();
        let mut tally = BatchTally::started(batch.len());
        if batch.is_empty() {
            return Ok(tally);
        }

        self.set_phase(SessionPhase::Deleting);
        tracing::info!(total = tally.total, "starting delete batch");

        for (index, item) in batch.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    deleted = tally.deleted,
                    failed = tally.failed,
                    total = tally.total,
                    "delete batch cancelled"
                );
                self.cancel = CancellationToken::new();
                self.set_phase(SessionPhase::Idle);
                return Ok(tally);
            }

            match self.client.delete_item(&item.id).await {
                Ok(true) => tally.deleted += 1,
                Ok(false) => {
                    tracing::warn!(id = %item.id, "item was not removed");
                    tally.failed += 1;
                }
                Err(e) => {
                    tracing::warn!(id = %item.id, error = %e, "delete failed");
                    tally.failed += 1;
                }
            }
            self.observer.on_progress(&tally);

            if index + 1 < batch.len() {
                tokio::time::sleep(self.pause_between_deletes()).await;
            }
        }

        // Every item is accounted for; the persisted scan is stale now.
        self.items.clear();
        if let Err(e) = self.cache.clear() {
            tracing::warn!(error = %e, "failed to clear scan cache");
        }
        self.set_phase(SessionPhase::Idle);

        tracing::info!(
            deleted = tally.deleted,
            failed = tally.failed,
            total = tally.total,
            "delete batch complete"
        );

        if let Err(e) = self.scan().await {
            tracing::warn!(error = %e, "post-batch rescan failed");
        }

        Ok(tally)
    }

    fn pause_between_deletes(&self) -> Duration {
        let jitter = if self.pacing.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..self.pacing.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.pacing.delete_delay_ms + jitter)
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.observer.on_phase(phase);
        }
    }
}
