pub mod app_config;
pub mod backend_client;
pub mod snapshot;

pub use backend_client::BackendClient;
pub use snapshot::{FeedStatus, FeedView, RefreshTicket, Snapshot, SnapshotStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },
    #[error("Backend pagination revisited {0}")]
    PaginationLoop(String),
}

impl StoreError {
    /// Worth retrying: connection trouble, timeouts and 5xx answers.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Http(e) => e.is_timeout() || e.is_connect(),
            StoreError::UpstreamStatus { status, .. } => *status >= 500,
            StoreError::PaginationLoop(_) => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
