//! Convert serialized timestamps and reservation documents into typed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::{Result, StayError};
use crate::reservation::{Reservation, ReservationId, ReservationStatus};

/// Parse an instant.
///
/// Accepts RFC 3339 (`2024-01-10T12:00:00+02:00`), a naive datetime
/// (`2024-01-10T12:00:00`, read as UTC) or a bare date (`2024-01-10`, midnight UTC).
///
/// # Errors
/// Returns `StayError::InvalidDate` when none of the formats match.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|e| StayError::InvalidDate {
            input: s.to_string(),
            reason: e.to_string(),
        })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservationRecord {
    #[serde(default)]
    id: Option<u64>,
    property_id: String,
    #[serde(default)]
    user_id: String,
    start_date: String,
    end_date: String,
    status: ReservationStatus,
}

/// Parse a JSON array of reservation documents.
///
/// Dates may use any format [`parse_instant`] accepts. Records without an
/// `id` are numbered in order after the largest explicit id, so they never
/// collide with one.
///
/// # Errors
/// `StayError::InvalidReservations` for malformed JSON or an unknown status,
/// `StayError::InvalidDate` for an unparseable date, `StayError::IdOverflow`
/// when id-less records cannot be numbered above `u64::MAX`.
pub fn parse_reservations(json: &str) -> Result<Vec<Reservation>> {
    let records: Vec<ReservationRecord> = serde_json::from_str(json)?;
    let mut next_free = match records.iter().filter_map(|r| r.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    };

    records
        .into_iter()
        .map(|record| {
            let id = match record.id {
                Some(id) => id,
                None => {
                    let id = next_free.ok_or(StayError::IdOverflow)?;
                    next_free = id.checked_add(1);
                    id
                }
            };
            Ok(Reservation {
                id: ReservationId(id),
                property_id: record.property_id,
                user_id: record.user_id,
                start_date: parse_instant(&record.start_date)?,
                end_date: parse_instant(&record.end_date)?,
                status: record.status,
            })
        })
        .collect()
}
