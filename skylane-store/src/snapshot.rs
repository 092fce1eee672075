use chrono::{DateTime, Utc};
use serde::Serialize;
use skylane_core::{Destination, Feed, FlightRecord, LocationDirectory};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// The most recently completed, fully drained fetch.
#[derive(Debug)]
pub struct Snapshot {
    pub flights: Vec<FlightRecord>,
    pub directory: LocationDirectory,
    /// Rows the backend sent that failed to decode.
    pub rejected: usize,
    pub fetched_at: DateTime<Utc>,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    /// No fetch has finished yet.
    Loading,
    Ready,
    /// Serving older data; the latest refresh failed.
    Stale,
    /// Every refresh so far failed.
    Unavailable,
}

/// Issued when a refresh starts; later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Consistent read of the feed: status, data and last error together.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub status: FeedStatus,
    pub snapshot: Option<Arc<Snapshot>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct FeedState {
    snapshot: Option<Arc<Snapshot>>,
    /// Newest ticket recorded as failed. `last_error` is only set while this
    /// is newer than the applied snapshot.
    failed: u64,
    last_error: Option<String>,
}

impl FeedState {
    fn applied(&self) -> u64 {
        self.snapshot.as_ref().map_or(0, |s| s.generation)
    }
}

/// Holds the latest flight snapshot and drops late refresh results.
///
/// A result is applied only while the store is open and no newer fetch has
/// been applied, so readers always see the newest complete fetch. A newer
/// failure never blocks an older success.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    issued: AtomicU64,
    closed: AtomicBool,
    state: RwLock<FeedState>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Apply a finished fetch. Returns `false` when the result was discarded.
    pub async fn complete(
        &self,
        ticket: RefreshTicket,
        flights: Feed<FlightRecord>,
        destinations: Feed<Destination>,
    ) -> bool {
        if self.is_closed() {
            info!("Discarding refresh {}: store closed", ticket.0);
            return false;
        }

        let mut state = self.state.write().await;
        let applied = state.applied();
        if ticket.0 <= applied {
            info!("Discarding refresh {}: refresh {} already applied", ticket.0, applied);
            return false;
        }

        let snapshot = Snapshot {
            directory: LocationDirectory::from_destinations(&destinations.items),
            rejected: flights.rejected,
            flights: flights.items,
            fetched_at: Utc::now(),
            generation: ticket.0,
        };
        info!(
            "Applied refresh {}: {} flight(s), {} destination alias(es), {} rejected",
            ticket.0,
            snapshot.flights.len(),
            snapshot.directory.len(),
            snapshot.rejected
        );

        state.snapshot = Some(Arc::new(snapshot));
        if ticket.0 > state.failed {
            state.last_error = None;
        }
        true
    }

    /// Record a failed fetch. Ignored once a newer fetch or failure is recorded.
    pub async fn fail(&self, ticket: RefreshTicket, error: impl Into<String>) -> bool {
        if self.is_closed() {
            return false;
        }

        let mut state = self.state.write().await;
        if ticket.0 <= state.applied() || ticket.0 <= state.failed {
            return false;
        }

        let error = error.into();
        warn!("Refresh {} failed: {}", ticket.0, error);
        state.failed = ticket.0;
        state.last_error = Some(error);
        true
    }

    /// Mark the consumer as torn down; pending results are ignored from now on.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.state.read().await.snapshot.clone()
    }

    pub async fn view(&self) -> FeedView {
        let state = self.state.read().await;
        let status = match (&state.snapshot, &state.last_error) {
            (None, None) => FeedStatus::Loading,
            (None, Some(_)) => FeedStatus::Unavailable,
            (Some(_), Some(_)) => FeedStatus::Stale,
            (Some(_), None) => FeedStatus::Ready,
        };
        FeedView {
            status,
            snapshot: state.snapshot.clone(),
            last_error: state.last_error.clone(),
        }
    }

    pub async fn status(&self) -> FeedStatus {
        self.view().await.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skylane_core::FlightStatus;

    fn flights(ids: &[i64]) -> Feed<FlightRecord> {
        let items = ids
            .iter()
            .map(|&id| FlightRecord {
                id,
                flight_code: format!("SK{}", id),
                airline: None,
                origin: "UIO".to_string(),
                destination: "GYE".to_string(),
                departure_datetime: "2025-11-01T08:00:00".to_string(),
                arrival_datetime: "2025-11-01T08:50:00".to_string(),
                adult_price: None,
                available_seats: 10,
                status: FlightStatus::Scheduled,
                is_available: true,
            })
            .collect();
        Feed::new(items, 0)
    }

    fn destinations() -> Feed<Destination> {
        Feed::new(
            vec![Destination {
                id: 1,
                name: "Quito".to_string(),
                code: "UIO".to_string(),
                province: "Pichincha".to_string(),
                is_active: true,
                image_url: None,
            }],
            0,
        )
    }

    fn ids(snapshot: &Snapshot) -> Vec<i64> {
        snapshot.flights.iter().map(|f| f.id).collect()
    }

    #[tokio::test]
    async fn test_loading_until_first_refresh() {
        let store = SnapshotStore::new();
        assert_eq!(store.status().await, FeedStatus::Loading);

        let ticket = store.begin_refresh();
        assert!(store.complete(ticket, flights(&[1, 2]), destinations()).await);

        let snapshot = store.current().await.expect("snapshot applied");
        assert_eq!(ids(&snapshot), vec![1, 2]);
        assert!(snapshot.directory.same_location("quito", "UIO"));
        assert_eq!(store.status().await, FeedStatus::Ready);
    }

    #[tokio::test]
    async fn test_late_result_is_ignored() {
        let store = SnapshotStore::new();
        let slow = store.begin_refresh();
        let fast = store.begin_refresh();

        assert!(store.complete(fast, flights(&[2]), destinations()).await);
        assert!(!store.complete(slow, flights(&[1]), destinations()).await);

        let snapshot = store.current().await.unwrap();
        assert_eq!(ids(&snapshot), vec![2]);
        assert_eq!(snapshot.generation, fast.generation());
    }

    #[tokio::test]
    async fn test_closed_store_discards_results() {
        let store = SnapshotStore::new();
        let ticket = store.begin_refresh();
        store.close();

        assert!(!store.complete(ticket, flights(&[1]), destinations()).await);
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let store = SnapshotStore::new();
        let first = store.begin_refresh();
        store.complete(first, flights(&[1]), destinations()).await;

        let second = store.begin_refresh();
        assert!(store.fail(second, "backend returned 502").await);

        let view = store.view().await;
        assert_eq!(view.status, FeedStatus::Stale);
        assert_eq!(view.last_error.as_deref(), Some("backend returned 502"));
        assert_eq!(ids(view.snapshot.as_ref().unwrap()), vec![1]);

        let third = store.begin_refresh();
        store.complete(third, flights(&[1, 3]), destinations()).await;
        assert_eq!(store.status().await, FeedStatus::Ready);
    }

    #[tokio::test]
    async fn test_older_success_lands_after_newer_failure() {
        let store = SnapshotStore::new();
        let older = store.begin_refresh();
        let newer = store.begin_refresh();

        assert!(store.fail(newer, "backend returned 502").await);
        assert_eq!(store.status().await, FeedStatus::Unavailable);

        assert!(store.complete(older, flights(&[1]), destinations()).await);
        let view = store.view().await;
        // data is available, but the newest attempt still failed
        assert_eq!(view.status, FeedStatus::Stale);
        assert_eq!(ids(view.snapshot.as_ref().unwrap()), vec![1]);

        // an even older failure changes nothing
        assert!(!store.fail(older, "timeout").await);
        assert_eq!(store.view().await.last_error.as_deref(), Some("backend returned 502"));
    }

    #[tokio::test]
    async fn test_newer_success_clears_error() {
        let store = SnapshotStore::new();
        let failing = store.begin_refresh();
        let succeeding = store.begin_refresh();

        assert!(store.complete(succeeding, flights(&[2]), destinations()).await);
        assert!(!store.fail(failing, "timeout").await);
        assert_eq!(store.status().await, FeedStatus::Ready);
    }

    #[tokio::test]
    async fn test_failure_before_any_data_is_unavailable() {
        let store = SnapshotStore::new();
        let ticket = store.begin_refresh();
        store.fail(ticket, "connection refused").await;
        assert_eq!(store.status().await, FeedStatus::Unavailable);
    }
}
