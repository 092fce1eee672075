use async_trait::async_trait;

use crate::flight::FlightRecord;
use crate::location::Destination;

/// A fully drained listing from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed<T> {
    pub items: Vec<T>,
    /// Rows the backend returned that could not be decoded.
    pub rejected: usize,
}

impl<T> Feed<T> {
    pub fn new(items: Vec<T>, rejected: usize) -> Self {
        Self { items, rejected }
    }
}

/// Source of the flight and destination listings that searches run over.
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Fetch every flight, following pagination to the end.
    async fn fetch_flights(&self) -> Result<Feed<FlightRecord>, Box<dyn std::error::Error + Send + Sync>>;

    /// Fetch the destination catalog used to resolve location aliases.
    async fn fetch_destinations(&self) -> Result<Feed<Destination>, Box<dyn std::error::Error + Send + Sync>>;
}
