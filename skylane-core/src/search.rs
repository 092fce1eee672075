use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::flight::FlightRecord;
use crate::location::LocationDirectory;

/// The user's current search constraints.
///
/// Empty strings and unset fields mean "no constraint"; they are never an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default = "default_passengers")]
    pub passengers: i64,
}

fn default_passengers() -> i64 {
    1
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            date: None,
            passengers: default_passengers(),
        }
    }
}

impl SearchCriteria {
    pub fn origin_constraint(&self) -> Option<&str> {
        non_blank(self.origin.as_deref())
    }

    pub fn destination_constraint(&self) -> Option<&str> {
        non_blank(self.destination.as_deref())
    }

    /// Requested seats; non-positive counts are clamped to 1.
    pub fn seats_required(&self) -> u32 {
        self.passengers.clamp(1, i64::from(u32::MAX)) as u32
    }

    /// 00:00:00 of the selected travel date.
    pub fn day_start(&self) -> Option<NaiveDateTime> {
        self.date.map(|date| date.and_time(NaiveTime::MIN))
    }

    /// Instant results are ranked against: the selected day, else `now`.
    pub fn reference_instant(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.day_start().unwrap_or(now)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Ordered matches plus the number of records dropped as malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub flights: Vec<FlightRecord>,
    pub skipped: usize,
}

impl SearchOutcome {
    pub fn count(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

/// Filter `all_flights` by `criteria` and rank the survivors by distance to
/// the reference instant.
///
/// Stages run in order: origin, destination, travel date, then seats and
/// status. The ranking sort is stable, so equally distant flights keep their
/// input order. Records with unparseable timestamps are skipped and counted.
/// When no date is selected, past flights stay eligible.
pub fn filter_and_rank(
    all_flights: &[FlightRecord],
    criteria: &SearchCriteria,
    directory: &LocationDirectory,
    now: NaiveDateTime,
) -> SearchOutcome {
    let mut skipped = 0;
    let mut candidates: Vec<(NaiveDateTime, &FlightRecord)> = Vec::with_capacity(all_flights.len());

    for flight in all_flights {
        match flight.departure().and_then(|departure| flight.arrival().map(|_| departure)) {
            Ok(departure) => candidates.push((departure, flight)),
            Err(e) => {
                tracing::debug!("Skipping flight: {}", e);
                skipped += 1;
            }
        }
    }

    if let Some(origin) = criteria.origin_constraint() {
        let wanted = directory.canonical(origin);
        candidates.retain(|(_, flight)| directory.canonical(&flight.origin) == wanted);
    }

    if let Some(destination) = criteria.destination_constraint() {
        let wanted = directory.canonical(destination);
        candidates.retain(|(_, flight)| directory.canonical(&flight.destination) == wanted);
    }

    if let Some(day_start) = criteria.day_start() {
        candidates.retain(|(departure, _)| *departure >= day_start);
    }

    let seats = criteria.seats_required();
    candidates.retain(|(_, flight)| flight.is_bookable_for(seats));

    let reference = criteria.reference_instant(now);
    candidates.sort_by_key(|(departure, _)| (*departure - reference).num_milliseconds().abs());

    if skipped > 0 {
        tracing::warn!("Search skipped {} malformed flight record(s)", skipped);
    }

    SearchOutcome {
        flights: candidates.into_iter().map(|(_, flight)| flight.clone()).collect(),
        skipped,
    }
}
