use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

/// Naive layouts the backend has been seen to emit, tried after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Lifecycle status of a flight as reported by the backend.
///
/// Values outside the known set are kept verbatim so they round-trip, but
/// only [`FlightStatus::Scheduled`] is bookable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlightStatus {
    Scheduled,
    Delayed,
    Cancelled,
    Completed,
    Other(String),
}

impl FlightStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Cancelled => "cancelled",
            FlightStatus::Completed => "completed",
            FlightStatus::Other(raw) => raw,
        }
    }

    pub fn is_bookable(&self) -> bool {
        *self == FlightStatus::Scheduled
    }
}

impl From<String> for FlightStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "scheduled" => FlightStatus::Scheduled,
            "delayed" => FlightStatus::Delayed,
            "cancelled" => FlightStatus::Cancelled,
            "completed" => FlightStatus::Completed,
            _ => FlightStatus::Other(raw),
        }
    }
}

impl From<FlightStatus> for String {
    fn from(status: FlightStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A flight as listed by the backend's `/flights/` endpoint.
///
/// Timestamps stay as the raw strings the backend sent; a record with an
/// unparseable timestamp still deserializes and is dropped later by the
/// search pipeline instead of failing the whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub id: i64,
    #[serde(default)]
    pub flight_code: String,
    #[serde(default)]
    pub airline: Option<Airline>,
    pub origin: String,
    pub destination: String,
    pub departure_datetime: String,
    pub arrival_datetime: String,
    #[serde(default)]
    pub adult_price: Option<String>,
    pub available_seats: i64,
    pub status: FlightStatus,
    /// Backend-computed flag; informational, the search pipeline re-derives it.
    #[serde(default)]
    pub is_available: bool,
}

impl FlightRecord {
    pub fn departure(&self) -> CoreResult<NaiveDateTime> {
        self.timestamp(&self.departure_datetime)
    }

    pub fn arrival(&self) -> CoreResult<NaiveDateTime> {
        self.timestamp(&self.arrival_datetime)
    }

    pub fn duration_minutes(&self) -> CoreResult<i64> {
        Ok((self.arrival()? - self.departure()?).num_minutes())
    }

    /// Scheduled and holding at least `passengers` free seats.
    pub fn is_bookable_for(&self, passengers: u32) -> bool {
        self.status.is_bookable() && self.available_seats >= i64::from(passengers)
    }

    fn timestamp(&self, raw: &str) -> CoreResult<NaiveDateTime> {
        parse_timestamp(raw).ok_or_else(|| CoreError::MalformedTimestamp {
            flight_id: self.id,
            value: raw.to_string(),
        })
    }
}

/// Parse a backend timestamp into a timezone-naive local instant.
///
/// Offsets are dropped after conversion, keeping the wall-clock time the
/// backend meant.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = at(2025, 11, 1, 8, 0);
        assert_eq!(parse_timestamp("2025-11-01T08:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-01T08:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-01 08:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-01T08:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2025-11-01T08:00:00Z "), Some(expected));
        // Wall-clock time is kept, the offset is not applied.
        assert_eq!(parse_timestamp("2025-11-01T08:00:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("01/11/2025"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_flight_record_deserialization() {
        let json = r#"
            {
                "id": 7,
                "flight_code": "EQ101",
                "airline": {"id": 1, "name": "Copa Airlines", "code": "CM", "logo_url": ""},
                "origin": "UIO",
                "destination": "GYE",
                "departure_datetime": "2025-11-01T08:00:00Z",
                "arrival_datetime": "2025-11-01T08:50:00Z",
                "duration_minutes": 50,
                "adult_price": "230.00",
                "available_seats": 12,
                "status": "scheduled",
                "is_available": true
            }
        "#;
        let flight: FlightRecord = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(flight.id, 7);
        assert_eq!(flight.status, FlightStatus::Scheduled);
        assert_eq!(flight.airline.as_ref().map(|a| a.code.as_str()), Some("CM"));
        assert_eq!(flight.duration_minutes().unwrap(), 50);
        assert!(flight.is_bookable_for(12));
        assert!(!flight.is_bookable_for(13));
    }

    #[test]
    fn test_unknown_status_is_kept_but_not_bookable() {
        let status = FlightStatus::from("boarding".to_string());
        assert_eq!(status, FlightStatus::Other("boarding".to_string()));
        assert_eq!(status.to_string(), "boarding");
        assert!(!status.is_bookable());
        assert_eq!(FlightStatus::from(" Scheduled ".to_string()), FlightStatus::Scheduled);
    }

    #[test]
    fn test_malformed_timestamp_reports_flight() {
        let json = r#"{"id": 3, "origin": "UIO", "destination": "GYE",
            "departure_datetime": "tomorrow", "arrival_datetime": "2025-11-01T08:50:00",
            "available_seats": 1, "status": "scheduled"}"#;
        let flight: FlightRecord = serde_json::from_str(json).unwrap();
        match flight.departure() {
            Err(CoreError::MalformedTimestamp { flight_id, value }) => {
                assert_eq!(flight_id, 3);
                assert_eq!(value, "tomorrow");
            }
            other => panic!("expected malformed timestamp, got {:?}", other),
        }
    }
}
