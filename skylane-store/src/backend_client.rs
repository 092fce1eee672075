use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use skylane_core::{Destination, Feed, FlightRecord, FlightSource};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app_config::BackendConfig;
use crate::{StoreError, StoreResult};

/// Upper bound for a single retry wait.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// One page of a DRF-style listing: `{count, next, previous, results}`.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<Value>,
}

/// Listings come paginated, but unpaginated endpoints answer with a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Paged(PageEnvelope),
    Plain(Vec<Value>),
}

impl From<Listing> for PageEnvelope {
    fn from(listing: Listing) -> Self {
        match listing {
            Listing::Paged(page) => page,
            Listing::Plain(results) => PageEnvelope {
                count: Some(results.len() as u64),
                next: None,
                previous: None,
                results,
            },
        }
    }
}

/// HTTP client for the booking backend's REST API.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
        })
    }

    pub fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}/", self.base_url, resource)
    }

    /// Follow `next` links until the listing is exhausted.
    pub async fn drain<T: DeserializeOwned>(&self, resource: &str) -> StoreResult<Feed<T>> {
        let mut next = Some(self.endpoint(resource));
        let mut visited = HashSet::new();
        let mut items = Vec::new();
        let mut rejected = 0;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(StoreError::PaginationLoop(url));
            }
            let page = self.get_page(&url).await?;
            debug!("Fetched {} row(s) of {} from {}", page.results.len(), resource, url);

            let (decoded, bad) = decode_rows::<T>(page.results, resource);
            items.extend(decoded);
            rejected += bad;
            next = page.next;
        }

        info!("Drained {}: {} item(s), {} rejected", resource, items.len(), rejected);
        Ok(Feed::new(items, rejected))
    }

    async fn get_page(&self, url: &str) -> StoreResult<PageEnvelope> {
        let mut attempt = 0;
        loop {
            match self.try_get_page(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = backoff_delay(self.retry_backoff, attempt);
                    warn!("Fetching {} failed ({}), retrying in {:?}", url, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_get_page(&self, url: &str) -> StoreResult<PageEnvelope> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let listing: Listing = response.json().await?;
        Ok(listing.into())
    }
}

/// Exponential backoff from `base`, capped at [`MAX_RETRY_DELAY`].
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .unwrap_or(MAX_RETRY_DELAY)
        .min(MAX_RETRY_DELAY)
}

/// Decode each row on its own so one bad row does not sink the page.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, resource: &str) -> (Vec<T>, usize) {
    let mut decoded = Vec::with_capacity(rows.len());
    let mut rejected = 0;
    for row in rows {
        match serde_json::from_value::<T>(row) {
            Ok(item) => decoded.push(item),
            Err(e) => {
                warn!("Rejected {} row: {}", resource, e);
                rejected += 1;
            }
        }
    }
    (decoded, rejected)
}

#[async_trait]
impl FlightSource for BackendClient {
    async fn fetch_flights(&self) -> Result<Feed<FlightRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.drain("flights").await?)
    }

    async fn fetch_destinations(&self) -> Result<Feed<Destination>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.drain("destinations").await?)
    }
}
