//! Reservation model shared by the checker, the repository and the booking flow.
//!
//! Field names on the wire follow the document-store layout used by the booking
//! front end (`propertyId`, `startDate`, ...), so snapshots can be passed through
//! without remapping.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StayError};

/// Opaque reservation identifier assigned by a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub u64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Submitted with a payment request, not yet confirmed.
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    /// Whether a reservation in this state keeps other guests out.
    pub fn blocks_availability(self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked (or requested) stay for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    pub property_id: String,
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReservationStatus,
}

impl Reservation {
    /// True when `instant` lies within `[start_date, end_date]`, both ends included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant <= self.end_date
    }

    /// Move `Pending` to `Confirmed`.
    ///
    /// # Errors
    /// Returns `StayError::InvalidTransition` from any other state.
    pub fn confirm(&mut self) -> Result<()> {
        self.transition(ReservationStatus::Confirmed, |from| {
            from == ReservationStatus::Pending
        })
    }

    /// Move `Pending` or `Confirmed` to `Cancelled`.
    ///
    /// # Errors
    /// Returns `StayError::InvalidTransition` when already cancelled.
    pub fn cancel(&mut self) -> Result<()> {
        self.transition(ReservationStatus::Cancelled, |from| {
            from.blocks_availability()
        })
    }

    fn transition(
        &mut self,
        to: ReservationStatus,
        allowed: impl Fn(ReservationStatus) -> bool,
    ) -> Result<()> {
        if !allowed(self.status) {
            return Err(StayError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
