use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::flight::FlightRecord;

pub const DEFAULT_UPCOMING_HORIZON_DAYS: i64 = 7;

/// Counts shown on the staff dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub bookable: usize,
    pub by_status: BTreeMap<String, usize>,
}

/// Flights departing strictly inside `(now, now + horizon)`, soonest first.
///
/// Records with an unparseable departure are left out.
pub fn upcoming_departures(flights: &[FlightRecord], now: NaiveDateTime, horizon: Duration) -> Vec<FlightRecord> {
    let until = now + horizon;
    let mut upcoming: Vec<(NaiveDateTime, &FlightRecord)> = flights
        .iter()
        .filter_map(|flight| flight.departure().ok().map(|departure| (departure, flight)))
        .filter(|(departure, _)| *departure > now && *departure < until)
        .collect();
    upcoming.sort_by_key(|(departure, _)| *departure);
    upcoming.into_iter().map(|(_, flight)| flight.clone()).collect()
}

pub fn status_summary(flights: &[FlightRecord]) -> StatusSummary {
    let mut summary = StatusSummary {
        total: flights.len(),
        ..Default::default()
    };
    for flight in flights {
        *summary.by_status.entry(flight.status.to_string()).or_insert(0) += 1;
        if flight.is_bookable_for(1) {
            summary.bookable += 1;
        }
    }
    summary
}
