use serde::Serialize;
use skylane_core::FlightSource;
use skylane_store::SnapshotStore;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    /// `false` when a newer refresh landed first or the store was closed.
    pub applied: bool,
    pub flights: usize,
    /// Backend rows that failed to decode.
    pub skipped: usize,
}

/// Fetch flights and destinations once and hand them to the store.
pub async fn refresh_once(source: &dyn FlightSource, store: &SnapshotStore) -> anyhow::Result<RefreshOutcome> {
    let ticket = store.begin_refresh();

    match tokio::try_join!(source.fetch_flights(), source.fetch_destinations()) {
        Ok((flights, destinations)) => {
            let count = flights.items.len();
            let skipped = flights.rejected + destinations.rejected;
            let applied = store.complete(ticket, flights, destinations).await;
            Ok(RefreshOutcome {
                applied,
                flights: count,
                skipped,
            })
        }
        Err(e) => {
            let message = e.to_string();
            store.fail(ticket, message.clone()).await;
            Err(anyhow::anyhow!(message))
        }
    }
}

/// Refresh immediately, then every `interval`, until `cancel` fires.
///
/// On exit the store is closed so a fetch still in flight is discarded.
pub async fn run_refresh_loop(
    source: Arc<dyn FlightSource>,
    store: Arc<SnapshotStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Feed refresh worker started, interval {:?}", interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = refresh_once(source.as_ref(), &store) => {
                        if let Err(e) = result {
                            error!("Feed refresh failed: {}", e);
                        }
                    }
                }
            }
        }
    }

    store.close();
    info!("Feed refresh worker stopped");
}
