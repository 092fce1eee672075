use chrono::{Local, NaiveDateTime};
use skylane_core::FlightSource;
use skylane_store::app_config::SearchConfig;
use skylane_store::SnapshotStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn FlightSource>,
    pub feed: Arc<SnapshotStore>,
    pub search: SearchConfig,
    /// Local wall-clock "now" that results are ranked against.
    pub clock: fn() -> NaiveDateTime,
}

impl AppState {
    pub fn new(source: Arc<dyn FlightSource>, feed: Arc<SnapshotStore>, search: SearchConfig) -> Self {
        Self {
            source,
            feed,
            search,
            clock: local_now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
