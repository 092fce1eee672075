pub mod flight;
pub mod location;
pub mod search;
pub mod page;
pub mod overview;
pub mod session;
pub mod repository;

pub use flight::{Airline, FlightRecord, FlightStatus};
pub use location::{Destination, LocationDirectory};
pub use search::{filter_and_rank, SearchCriteria, SearchOutcome};
pub use page::{paginate, Page};
pub use session::{Capability, Role, Session};
pub use repository::{Feed, FlightSource};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed timestamp in flight {flight_id}: {value:?}")]
    MalformedTimestamp { flight_id: i64, value: String },
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Role {role} lacks capability {capability}")]
    Forbidden { role: Role, capability: Capability },
}

pub type CoreResult<T> = Result<T, CoreError>;
