//! Booking submission and status changes.
//!
//! Submitting a booking validates the payer's phone number, re-checks
//! availability against the store and writes a `pending` reservation. No money
//! moves here. The availability check is advisory: two submissions racing for
//! the same dates can both succeed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityChecker;
use crate::clock::Clock;
use crate::error::{Result, StayError};
use crate::range::CandidateRange;
use crate::repository::{InMemoryReservations, NewReservation, ReservationSource};
use crate::reservation::{Reservation, ReservationId, ReservationStatus};

const MIN_DIGITS: usize = 9;
const MAX_DIGITS: usize = 15;

/// A phone number in canonical form: optional leading `+`, then digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a user-entered phone number.
    ///
    /// Spaces, dashes, dots and parentheses are stripped. What remains must be
    /// an optional `+` followed by 9 to 15 ASCII digits.
    ///
    /// # Errors
    /// Returns `StayError::InvalidPhoneNumber` for anything else.
    pub fn parse(raw: &str) -> Result<Self> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

        let valid = digits.chars().all(|c| c.is_ascii_digit())
            && (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len());
        if !valid {
            return Err(StayError::InvalidPhoneNumber(raw.to_string()));
        }
        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = StayError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// What a guest submits from the payment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub property_id: String,
    pub user_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub phone: String,
}

/// Validate and record a booking as `pending`.
///
/// # Errors
/// - `StayError::InvalidPhoneNumber` if the phone does not parse.
/// - `StayError::EmptyPropertyId` if no property is given.
/// - `StayError::Unavailable` if the range conflicts with a blocking reservation.
pub fn submit_booking<C: Clock>(
    store: &InMemoryReservations,
    checker: &AvailabilityChecker<C>,
    request: &BookingRequest,
) -> Result<Reservation> {
    let phone = PhoneNumber::parse(&request.phone)?;
    let range = CandidateRange::new(request.start, request.end);

    let snapshot = store.reservations_for(&request.property_id)?;
    let availability = checker.check_range(&request.property_id, &range, &snapshot)?;
    if availability.is_occupied {
        tracing::info!(
            property_id = %request.property_id,
            until = ?availability.occupied_until,
            "booking rejected, dates taken"
        );
        return Err(StayError::Unavailable {
            occupied_until: availability.occupied_until,
        });
    }

    let reservation = store.insert(NewReservation {
        property_id: request.property_id.clone(),
        user_id: request.user_id.clone(),
        start_date: range.start,
        end_date: range.end,
        status: ReservationStatus::Pending,
    })?;
    tracing::info!(
        reservation = %reservation.id,
        property_id = %reservation.property_id,
        %phone,
        nights = range.nights(),
        "booking recorded as pending"
    );
    Ok(reservation)
}

/// Mark a pending booking as confirmed.
pub fn confirm_booking(store: &InMemoryReservations, id: ReservationId) -> Result<Reservation> {
    let reservation = store.update(id, Reservation::confirm)?;
    tracing::info!(reservation = %id, "booking confirmed");
    Ok(reservation)
}

/// Cancel a pending or confirmed booking, releasing its dates.
pub fn cancel_booking(store: &InMemoryReservations, id: ReservationId) -> Result<Reservation> {
    let reservation = store.update(id, Reservation::cancel)?;
    tracing::info!(reservation = %id, "booking cancelled");
    Ok(reservation)
}
