//! Error types for stay-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::reservation::{ReservationId, ReservationStatus};

#[derive(Error, Debug)]
pub enum StayError {
    #[error("Property id must not be empty")]
    EmptyPropertyId,

    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Invalid reservations JSON: {0}")]
    InvalidReservations(#[from] serde_json::Error),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// The requested range collides with at least one blocking reservation.
    #[error("Property is not available{}", until_suffix(.occupied_until))]
    Unavailable {
        occupied_until: Option<DateTime<Utc>>,
    },

    #[error("Reservation {0} appears more than once in the snapshot")]
    DuplicateReservation(ReservationId),

    #[error("Reservation ids exhausted")]
    IdOverflow,

    #[error("Reservation {0} not found")]
    NotFound(ReservationId),

    #[error("Cannot move reservation {id} from {from} to {to}")]
    InvalidTransition {
        id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    },
}

fn until_suffix(until: &Option<DateTime<Utc>>) -> String {
    match until {
        Some(dt) => format!(" until {}", dt.format("%Y-%m-%d")),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, StayError>;
